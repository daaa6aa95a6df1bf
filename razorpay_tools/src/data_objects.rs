use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/orders`. `amount` is in minor currency units, as the API requires.
#[derive(Debug, Clone, Serialize)]
pub struct NewRazorpayOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub notes: HashMap<String, String>,
}

/// The order entity as returned by the API. Only the fields the payment flow uses are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub notes: HashMap<String, String>,
    pub status: String,
}
