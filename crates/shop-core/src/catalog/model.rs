//! Typed records stored in the catalog collections.
//!
//! Missing fields fall back to defaults, so partially written documents
//! still decode.

use serde::{Deserialize, Serialize};

use crate::store::Millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub role: String,
    pub status: String,
    pub created_at: Millis,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            username: String::new(),
            email: String::new(),
            address: String::new(),
            phone: String::new(),
            role: "user".to_string(),
            status: "active".to_string(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub discount: f64,
    pub stock: u32,
    pub sales: u32,
    pub popular: bool,
    pub status: String,
    pub images: Vec<String>,
    pub created_at: Millis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub phone: String,
    pub address: String,
    pub lines: Vec<OrderLine>,
    pub total_price: f64,
    pub status: String,
    pub created_at: Millis,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            username: String::new(),
            phone: String::new(),
            address: String::new(),
            lines: Vec::new(),
            total_price: 0.0,
            status: "pending".to_string(),
            created_at: 0,
        }
    }
}

/// Promotion: a voucher or a flash sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: String,
    pub event_type: String,
    pub title: String,
    pub description: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub start_date: Millis,
    pub end_date: Millis,
    pub applicable_products: Option<Vec<String>>,
    pub min_purchase: f64,
    pub max_discount: f64,
    pub applicable_users: Option<Vec<String>>,
    pub usage_limit: u32,
    pub status: String,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: String::new(),
            event_type: "voucher".to_string(),
            title: String::new(),
            description: String::new(),
            discount_type: "percentage".to_string(),
            discount_value: 0.0,
            start_date: 0,
            end_date: 0,
            applicable_products: None,
            min_purchase: 0.0,
            max_discount: 0.0,
            applicable_users: None,
            usage_limit: 0,
            status: "inactive".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }
}
