// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Order;

pub const RESULT_COLUMNS: [&str; 6] = [
    "Order ID",
    "Customer ID",
    "Order Date",
    "Status",
    "Tracking Number",
    "Discount Amount",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub tag: String,
    pub cells: [String; 6],
}

impl ResultRow {
    fn from_order(index: usize, order: &Order) -> Self {
        Self {
            tag: format!("row_{index}"),
            cells: [
                order.id_text(),
                order.customer_id.clone(),
                order.order_date.clone(),
                order.status.clone(),
                order.tracking_number.clone(),
                order.discount_amount.clone(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsTable {
    rows: Vec<ResultRow>,
}

impl ResultsTable {
    pub fn render(&mut self, orders: &[Order]) -> Option<Order> {
        self.rows = orders
            .iter()
            .enumerate()
            .map(|(index, order)| ResultRow::from_order(index, order))
            .collect();
        orders.first().cloned()
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
