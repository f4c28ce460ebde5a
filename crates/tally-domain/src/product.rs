use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProductKind {
    Product,
    Service,
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProductKind::Product => "Product",
            ProductKind::Service => "Service",
        };
        f.write_str(label)
    }
}

/// Catalogue entry that can be copied into document lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub kind: ProductKind,
    pub unit_price: f64,
    /// Tax percentage applied to lines created from this product.
    #[serde(default)]
    pub tax_rate: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, kind: ProductKind, unit_price: f64, tax_rate: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            unit_price,
            tax_rate,
        }
    }
}

impl Identifiable for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Product {
    fn name(&self) -> &str {
        &self.name
    }
}
