use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A single inventory entry. Items are never deleted automatically on
/// expiry; expired items stay queryable until the owner acts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: ObjectId,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub purchase_date: Option<DateTime>,
    pub expiry_date: DateTime,
    /// Items without a threshold are never flagged as low stock.
    pub low_stock_threshold: Option<f64>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Item {
    pub const COLLECTION: &'static str = "items";

    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .is_some_and(|threshold| self.quantity <= threshold)
    }
}
