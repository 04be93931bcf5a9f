//! Declarative model descriptors.
//!
//! A descriptor is the explicit, static description of a domain type: its
//! name, its ordered fields, and for each field the value type plus the
//! default/unique markers. Extraction reads descriptors only, so every schema
//! artifact is derived from data registered once at startup.

use serde::Serialize;

// ── Field Types ──────────────────────────────────────────────────

/// The declared value type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    /// A closed set of string values.
    Literal(Vec<String>),
    /// A named enumeration; values are strings.
    Enum(String),
    /// A reference to another structured type by name.
    Object(String),
    /// A type that could not be resolved; kept by name only.
    Opaque(String),
    Optional(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn object(name: &str) -> Self {
        Self::Object(name.to_string())
    }

    pub fn enumeration(name: &str) -> Self {
        Self::Enum(name.to_string())
    }

    pub fn literal(values: &[&str]) -> Self {
        Self::Literal(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Whether the value is a scalar (possibly wrapped in `Optional`/`List`).
    pub fn is_basic(&self) -> bool {
        match self {
            Self::Str | Self::Int | Self::Float | Self::Bool | Self::Literal(_) | Self::Enum(_) => {
                true
            }
            Self::Object(_) | Self::Opaque(_) => false,
            Self::Optional(inner) | Self::List(inner) => inner.is_basic(),
        }
    }

    /// Strip `Optional` and `List` wrappers.
    pub fn unwrapped(&self) -> &FieldType {
        match self {
            Self::Optional(inner) | Self::List(inner) => inner.unwrapped(),
            other => other,
        }
    }

    /// The referenced structured type name, if the unwrapped value is an object.
    pub fn object_name(&self) -> Option<&str> {
        match self.unwrapped() {
            Self::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Semantic type tag recorded on property definitions.
    pub fn type_tag(&self) -> String {
        match self {
            Self::Str | Self::Literal(_) => "str".to_string(),
            Self::Int => "int".to_string(),
            Self::Float => "float".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Enum(name) | Self::Object(name) | Self::Opaque(name) => name.clone(),
            Self::Optional(inner) => inner.type_tag(),
            Self::List(inner) => format!("list[{}]", inner.type_tag()),
        }
    }
}

// ── Fields ───────────────────────────────────────────────────────

/// One declared field of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: FieldType,
    /// The field declares a default value.
    pub has_default: bool,
    /// Explicit uniqueness annotation; never inferred from the type.
    pub unique: bool,
}

impl FieldDescriptor {
    pub fn new(name: &str, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            has_default: false,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// A field is required when it has no default and is not optional.
    pub fn required(&self) -> bool {
        !self.has_default && !self.ty.is_optional()
    }
}

// ── Models ───────────────────────────────────────────────────────

/// Static description of an entity, relationship, or structured value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    /// Marker supertype: never instantiated, never constrained.
    pub is_abstract: bool,
    /// Name of the supertype this model extends, if any.
    pub parent: Option<String>,
}

impl ModelDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            is_abstract: false,
            parent: None,
        }
    }

    /// Inherit all fields of `parent`; they precede this model's own fields.
    pub fn extends(mut self, parent: &ModelDescriptor) -> Self {
        let mut fields = parent.fields.clone();
        fields.append(&mut self.fields);
        self.fields = fields;
        self.parent = Some(parent.name.clone());
        self
    }

    pub fn abstract_marker(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        // A redeclared field overrides the inherited one in place.
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ── Registry ─────────────────────────────────────────────────────

/// Caller-supplied set of structured value types.
///
/// Populated once and iterated in registration order, so every discovery
/// pass over the registry is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    models: Vec<ModelDescriptor>,
}

impl TypeRegistry {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    pub fn register(&mut self, model: ModelDescriptor) {
        self.models.push(model);
    }

    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Whether `name` is a registered, non-abstract structured type.
    pub fn is_structured(&self, name: &str) -> bool {
        self.get(name).is_some_and(|m| !m.is_abstract)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rules() {
        let plain = FieldDescriptor::new("id", FieldType::Str);
        let defaulted = FieldDescriptor::new("main", FieldType::Bool).with_default();
        let optional = FieldDescriptor::new("basis", FieldType::optional(FieldType::Str));

        assert!(plain.required());
        assert!(!defaulted.required());
        assert!(!optional.required());
    }

    #[test]
    fn test_basic_types() {
        assert!(FieldType::Str.is_basic());
        assert!(FieldType::optional(FieldType::Float).is_basic());
        assert!(FieldType::list(FieldType::Str).is_basic());
        assert!(FieldType::literal(&["fixed", "variable"]).is_basic());
        assert!(FieldType::enumeration("DayCountBasis").is_basic());
        assert!(!FieldType::object("Date").is_basic());
        assert!(!FieldType::optional(FieldType::object("Date")).is_basic());
        assert!(!FieldType::Opaque("Decimal".into()).is_basic());
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(FieldType::Str.type_tag(), "str");
        assert_eq!(FieldType::optional(FieldType::Float).type_tag(), "float");
        assert_eq!(FieldType::literal(&["en", "de"]).type_tag(), "str");
        assert_eq!(FieldType::object("InterestRate").type_tag(), "InterestRate");
        assert_eq!(
            FieldType::optional(FieldType::list(FieldType::object("CfiCode"))).type_tag(),
            "list[CfiCode]"
        );
    }

    #[test]
    fn test_object_name_unwraps() {
        let ty = FieldType::optional(FieldType::list(FieldType::object("Price")));
        assert_eq!(ty.object_name(), Some("Price"));
        assert_eq!(FieldType::Int.object_name(), None);
    }

    #[test]
    fn test_extends_prepends_parent_fields() {
        let parent = ModelDescriptor::new("Base")
            .abstract_marker()
            .field(FieldDescriptor::new("name", FieldType::Str));
        let child = ModelDescriptor::new("Child")
            .field(FieldDescriptor::new("extra", FieldType::Int))
            .extends(&parent);

        assert_eq!(child.parent.as_deref(), Some("Base"));
        assert!(!child.is_abstract);
        assert_eq!(child.field_names().collect::<Vec<_>>(), vec!["name", "extra"]);
    }

    #[test]
    fn test_field_redeclaration_overrides() {
        let model = ModelDescriptor::new("M")
            .field(FieldDescriptor::new("id", FieldType::Str))
            .field(FieldDescriptor::new("id", FieldType::Str).unique());

        assert_eq!(model.fields.len(), 1);
        assert!(model.fields[0].unique);
    }

    #[test]
    fn test_registry_excludes_abstract_from_structured() {
        let mut registry = TypeRegistry::new(vec![
            ModelDescriptor::new("Date"),
            ModelDescriptor::new("FinancialInstrument").abstract_marker(),
        ]);
        assert!(!registry.is_structured("Price"));
        registry.register(ModelDescriptor::new("Price"));

        assert!(registry.is_structured("Date"));
        assert!(registry.is_structured("Price"));
        assert!(!registry.is_structured("FinancialInstrument"));
        assert!(!registry.is_structured("Unknown"));
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
    }
}
