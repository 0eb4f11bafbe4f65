// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ids::OrderId;

// Never enforced; the form keeps status as free text.
pub const KNOWN_STATUSES: [&str; 7] = [
    "pending",
    "processing",
    "shipped",
    "delivered",
    "cancelled",
    "returned",
    "refunded",
];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, deserialize_with = "text_field")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "text_field")]
    pub status: String,
    #[serde(default, deserialize_with = "text_field")]
    pub order_date: String,
    #[serde(default, deserialize_with = "text_field")]
    pub discount_amount: String,
    #[serde(default, deserialize_with = "text_field")]
    pub tracking_number: String,
}

impl Order {
    pub fn id_text(&self) -> String {
        self.order_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

fn text_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Retrieve,
    Delete,
    Search,
    Ship,
}

impl Operation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Retrieve => "retrieve",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Ship => "ship",
        }
    }
}
