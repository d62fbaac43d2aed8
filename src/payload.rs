//! Mapping of local parts onto WooCommerce product payloads

use crate::source::PartRecord;
use serde::Serialize;

/// WooCommerce stock status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    InStock,
    OutOfStock,
}

/// Product body sent to the batch endpoint
///
/// `id` is only set for updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub sku: String,
    pub regular_price: String,
    pub manage_stock: bool,
    pub stock_quantity: u64,
    pub stock_status: StockStatus,
}

/// Build the create payload for a part
pub fn to_payload(part: &PartRecord) -> SyncPayload {
    SyncPayload {
        id: None,
        name: part.name.clone(),
        sku: part.mpn.clone(),
        regular_price: part.price.clone(),
        manage_stock: true,
        stock_quantity: part.stock_qty,
        stock_status: if part.stock_qty > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        },
    }
}
