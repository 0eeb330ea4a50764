//! Inventory item models.

use serde::{Deserialize, Serialize};

/// Top-level category of a stocked item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Medication,
    Supply,
    Lab,
    Nursing,
    Equipment,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Medication => "medication",
            ItemCategory::Supply => "supply",
            ItemCategory::Lab => "lab",
            ItemCategory::Nursing => "nursing",
            ItemCategory::Equipment => "equipment",
        }
    }

    /// Parse from the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "medication" => Some(ItemCategory::Medication),
            "supply" => Some(ItemCategory::Supply),
            "lab" => Some(ItemCategory::Lab),
            "nursing" => Some(ItemCategory::Nursing),
            "equipment" => Some(ItemCategory::Equipment),
            _ => None,
        }
    }
}

/// A stocked drug or supply.
///
/// Stock is tracked in whole packages; the dispensed-to-patient unit
/// (tablet, vial) converts through `units_per_package`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    /// Unique item ID
    pub id: String,
    /// Display name (e.g., "Paracetamol 500mg Tablet")
    pub name: String,
    /// Stock category
    pub category: ItemCategory,
    /// Therapeutic drug category (e.g., "NSAID", "Antibiotic")
    pub drug_category: Option<String>,
    /// Dosage form (tablet, syrup, injection, ...)
    pub dosage_form: Option<String>,
    /// Strength label (e.g., "500mg")
    pub strength: Option<String>,
    /// Packages currently on hand (never negative)
    pub stock_quantity: i64,
    /// Dispensable units per package
    pub units_per_package: i64,
    /// Price per unit (tablet) for self-pay and HMO patients
    pub unit_price: f64,
    /// Discounted per-unit price for corporate patients, if negotiated
    pub corporate_price: Option<f64>,
    /// Stock level at or below which the item is flagged for reorder
    pub reorder_level: i64,
    /// Expiry date (RFC3339 date), if tracked
    pub expiry_date: Option<String>,
    /// Soft-delete flag
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl InventoryItem {
    /// Create a new inventory item with required fields.
    pub fn new(name: String, category: ItemCategory) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            category,
            drug_category: None,
            dosage_form: None,
            strength: None,
            stock_quantity: 0,
            units_per_package: 1,
            unit_price: 0.0,
            corporate_price: None,
            reorder_level: 0,
            expiry_date: None,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether stock has fallen to or below the reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }

    /// Units per package, treating zero/negative as 1 so package math
    /// never divides by zero.
    pub fn effective_units_per_package(&self) -> i64 {
        if self.units_per_package <= 0 {
            1
        } else {
            self.units_per_package
        }
    }

    /// Per-unit price for a given billing arrangement. Corporate patients
    /// get the negotiated price when one exists, otherwise the list price.
    pub fn unit_price_for(&self, corporate: bool) -> f64 {
        if corporate {
            self.corporate_price.unwrap_or(self.unit_price)
        } else {
            self.unit_price
        }
    }
}
