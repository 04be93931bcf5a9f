//! Schema extraction from model descriptors.
//!
//! Walks descriptors and produces entity, complex-property, and relationship
//! definitions. Extraction never fails: a field whose type cannot be resolved
//! is kept with its opaque type tag rather than rejected, so schema capture is
//! always best-effort and safe to rerun.

use crate::descriptor::{FieldDescriptor, ModelDescriptor, TypeRegistry};
use crate::key::infer_key;
use crate::types::{ComplexPropertiesDef, EntityDef, PropertyDef, RelTypeDef};

/// Relationship kind linking a concrete subtype to its abstract supertype.
pub const INHERITANCE_REL: &str = "IsA";

// ── Entities ─────────────────────────────────────────────────────

/// Extract an entity definition from a descriptor.
///
/// With `is_abstract` set, no fields are scanned: the entity is a marker for
/// a type-hierarchy concept and must not leak properties or constraints onto
/// its label.
pub fn extract_entity(model: &ModelDescriptor, is_abstract: bool) -> EntityDef {
    let properties = if is_abstract {
        Vec::new()
    } else {
        model.fields.iter().map(property_def).collect()
    };

    EntityDef {
        name: model.name.clone(),
        key: infer_key(&model.name),
        properties,
        is_abstract,
    }
}

fn property_def(field: &FieldDescriptor) -> PropertyDef {
    PropertyDef {
        name: field.name.clone(),
        ty: field.ty.type_tag(),
        required: field.required(),
        unique: field.unique,
    }
}

// ── Relationships ────────────────────────────────────────────────

/// Build a relationship definition whose endpoint keys are the canonical
/// keys of the two descriptors.
pub fn extract_relationship(name: &str, from: &ModelDescriptor, to: &ModelDescriptor) -> RelTypeDef {
    RelTypeDef {
        name: name.to_string(),
        from_label: from.name.clone(),
        to_label: to.name.clone(),
        from_key: infer_key(&from.name),
        to_key: infer_key(&to.name),
    }
}

/// One `IsA` relationship per subtype, pointing at the abstract supertype.
pub fn inheritance_relationships(
    subtypes: &[ModelDescriptor],
    supertype: &ModelDescriptor,
) -> Vec<RelTypeDef> {
    subtypes
        .iter()
        .map(|sub| extract_relationship(INHERITANCE_REL, sub, supertype))
        .collect()
}

/// Deterministic name for the relationship behind a nested field:
/// owner name followed by the field name with its first character upper-cased.
///
/// `("InterestRate", "paymentDate")` → `InterestRatePaymentDate`.
pub fn nested_relationship_name(owner: &str, field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("{owner}{}{}", first.to_uppercase(), chars.as_str()),
        None => owner.to_string(),
    }
}

// ── Complex Properties ───────────────────────────────────────────

/// All non-abstract structured types in the registry, in registration order.
pub fn discover_structured_types(registry: &TypeRegistry) -> Vec<&ModelDescriptor> {
    registry.iter().filter(|m| !m.is_abstract).collect()
}

/// Extract the auxiliary node definition for a structured type.
///
/// Fields whose value is a registered structured type are left out here; they
/// become relationships (see [`complex_properties_relationship_types`]). Every
/// other field, including unresolved references, becomes a property, so no
/// field is silently dropped.
pub fn extract_complex_properties(
    model: &ModelDescriptor,
    registry: &TypeRegistry,
) -> ComplexPropertiesDef {
    let properties = model
        .fields
        .iter()
        .filter(|field| !is_edge_field(field, registry))
        .inspect(|field| {
            if !field.ty.is_basic() {
                tracing::debug!(
                    model = %model.name,
                    field = %field.name,
                    type_tag = %field.ty.type_tag(),
                    "Unresolved field type kept as opaque property"
                );
            }
        })
        .map(property_def)
        .collect();

    ComplexPropertiesDef {
        name: model.name.clone(),
        key: infer_key(&model.name),
        properties,
    }
}

/// Complex-property definitions for every discovered structured type.
pub fn complex_properties_node_types(registry: &TypeRegistry) -> Vec<ComplexPropertiesDef> {
    discover_structured_types(registry)
        .into_iter()
        .map(|m| extract_complex_properties(m, registry))
        .collect()
}

/// Relationships among structured types, derived from their nested fields.
pub fn complex_properties_relationship_types(registry: &TypeRegistry) -> Vec<RelTypeDef> {
    let mut rels = Vec::new();

    for model in discover_structured_types(registry) {
        for field in &model.fields {
            let Some(target) = field
                .ty
                .object_name()
                .filter(|name| registry.is_structured(name))
                .and_then(|name| registry.get(name))
            else {
                continue;
            };

            let name = nested_relationship_name(&model.name, &field.name);
            rels.push(extract_relationship(&name, model, target));
        }
    }

    rels
}

fn is_edge_field(field: &FieldDescriptor, registry: &TypeRegistry) -> bool {
    field
        .ty
        .object_name()
        .is_some_and(|name| registry.is_structured(name))
}
