//! Relationship catalogs for the financial-instrument domain.
//!
//! Every definition is built from descriptors, so endpoint keys always match
//! the canonical keys of the entities they connect.

use super::models;
use crate::extract::{self, extract_relationship};
use crate::types::RelTypeDef;

/// Core associations between primary entities.
///
/// Relationships touching the abstract instrument marker are not part of this
/// catalog; the marker only takes part in `IsA` and property relationships.
pub fn all_relationship_types() -> Vec<RelTypeDef> {
    vec![
        extract_relationship("ListedOn", &models::listing(), &models::trading_venue()),
        extract_relationship("QuoteOfListing", &models::quote(), &models::listing()),
    ]
}

/// Nested fields among value types, modelled as edges.
pub fn property_relationship_types() -> Vec<RelTypeDef> {
    vec![
        extract_relationship("PaymentDate", &models::interest_rate(), &models::date()),
        extract_relationship("PriceCurrency", &models::price(), &models::currency()),
    ]
}

/// Embedded bond objects, modelled as edges to their value-type nodes.
pub fn bond_property_relationship_types() -> Vec<RelTypeDef> {
    let bond = models::bond();
    vec![
        extract_relationship("HasInterestRate", &bond, &models::interest_rate()),
        extract_relationship("HasMaturityDate", &bond, &models::date()),
        extract_relationship("HasIssueDate", &bond, &models::date()),
        extract_relationship("HasConversionPrice", &bond, &models::price()),
        extract_relationship("CurrencyOfDenomination", &bond, &models::currency()),
        extract_relationship(
            "UnderlyingInstrument",
            &bond,
            &models::financial_instrument(),
        ),
    ]
}

/// `IsA` edges from each concrete instrument to the abstract supertype.
pub fn inheritance_relationship_types() -> Vec<RelTypeDef> {
    extract::inheritance_relationships(
        &models::instrument_subtypes(),
        &models::financial_instrument(),
    )
}

/// Relationships derived from nested fields of the registered value types.
pub fn complex_properties_relationship_types() -> Vec<RelTypeDef> {
    extract::complex_properties_relationship_types(&models::structured_types())
}
