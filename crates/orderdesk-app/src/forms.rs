// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    OrderId,
    CustomerId,
    Status,
    OrderDate,
    DiscountAmount,
    TrackingNumber,
}

impl FieldKey {
    pub const ALL: [Self; 6] = [
        Self::OrderId,
        Self::CustomerId,
        Self::Status,
        Self::OrderDate,
        Self::DiscountAmount,
        Self::TrackingNumber,
    ];

    pub const FILTERS: [Self; 5] = [
        Self::CustomerId,
        Self::Status,
        Self::OrderDate,
        Self::DiscountAmount,
        Self::TrackingNumber,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderId => "order_id",
            Self::CustomerId => "customer_id",
            Self::Status => "status",
            Self::OrderDate => "order_date",
            Self::DiscountAmount => "discount_amount",
            Self::TrackingNumber => "tracking_number",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OrderId => "Order ID",
            Self::CustomerId => "Customer ID",
            Self::Status => "Status",
            Self::OrderDate => "Order Date",
            Self::DiscountAmount => "Discount Amount",
            Self::TrackingNumber => "Tracking Number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSet {
    pub order_id: String,
    pub customer_id: String,
    pub status: String,
    pub order_date: String,
    pub discount_amount: String,
    pub tracking_number: String,
}

impl FieldSet {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::OrderId => &self.order_id,
            FieldKey::CustomerId => &self.customer_id,
            FieldKey::Status => &self.status,
            FieldKey::OrderDate => &self.order_date,
            FieldKey::DiscountAmount => &self.discount_amount,
            FieldKey::TrackingNumber => &self.tracking_number,
        }
    }

    fn get_mut(&mut self, key: FieldKey) -> &mut String {
        match key {
            FieldKey::OrderId => &mut self.order_id,
            FieldKey::CustomerId => &mut self.customer_id,
            FieldKey::Status => &mut self.status,
            FieldKey::OrderDate => &mut self.order_date,
            FieldKey::DiscountAmount => &mut self.discount_amount,
            FieldKey::TrackingNumber => &mut self.tracking_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    Backspace,
    Replace(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderForm {
    fields: FieldSet,
}

impl OrderForm {
    pub fn read(&self) -> FieldSet {
        self.fields.clone()
    }

    pub fn field(&self, key: FieldKey) -> &str {
        self.fields.get(key)
    }

    pub fn edit(&mut self, key: FieldKey, edit: FieldEdit) {
        let value = self.fields.get_mut(key);
        match edit {
            FieldEdit::Insert(ch) => value.push(ch),
            FieldEdit::Backspace => {
                value.pop();
            }
            FieldEdit::Replace(text) => *value = text,
        }
    }

    pub fn write(&mut self, order: &Order) {
        self.fields = FieldSet {
            order_id: order.id_text(),
            customer_id: order.customer_id.clone(),
            status: order.status.clone(),
            order_date: display_date(&order.order_date),
            discount_amount: order.discount_amount.clone(),
            tracking_number: order.tracking_number.clone(),
        };
    }

    // `order_id` survives.
    pub fn clear(&mut self) {
        let order_id = std::mem::take(&mut self.fields.order_id);
        self.fields = FieldSet {
            order_id,
            ..FieldSet::default()
        };
    }

    pub fn clear_order_id(&mut self) {
        self.fields.order_id.clear();
    }
}

// The date is taken as written, with no offset conversion. Unparseable values
// come back unchanged.
pub fn display_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match parse_calendar_date(trimmed) {
        Some(date) => date
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| raw.to_owned()),
        None => raw.to_owned(),
    }
}

fn parse_calendar_date(value: &str) -> Option<Date> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed.date());
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    );
    if let Ok(parsed) = PrimitiveDateTime::parse(value, naive) {
        return Some(parsed.date());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(parsed) = Date::parse(value, date_only) {
        return Some(parsed);
    }

    // Offsets or separators the formats above reject still lead with the date.
    let (head, rest) = value.split_at_checked(10)?;
    if !rest.starts_with(['T', 't', ' ']) {
        return None;
    }
    Date::parse(head, date_only).ok()
}

#[cfg(test)]
mod tests {
    use super::{FieldEdit, FieldKey, FieldSet, OrderForm, display_date};
    use crate::{Order, OrderId};

    fn sample_order() -> Order {
        Order {
            order_id: Some(OrderId::new("O1")),
            customer_id: "C1".to_owned(),
            status: "NEW".to_owned(),
            order_date: "2024-01-05T00:00:00Z".to_owned(),
            discount_amount: "0".to_owned(),
            tracking_number: String::new(),
        }
    }

    #[test]
    fn write_truncates_date_and_sets_all_fields() {
        let mut form = OrderForm::default();
        form.write(&sample_order());

        assert_eq!(
            form.read(),
            FieldSet {
                order_id: "O1".to_owned(),
                customer_id: "C1".to_owned(),
                status: "NEW".to_owned(),
                order_date: "2024-01-05".to_owned(),
                discount_amount: "0".to_owned(),
                tracking_number: String::new(),
            }
        );
    }

    #[test]
    fn clear_keeps_order_id_and_is_idempotent() {
        let mut form = OrderForm::default();
        form.write(&sample_order());

        form.clear();
        let first = form.read();
        form.clear();
        assert_eq!(form.read(), first);

        assert_eq!(first.order_id, "O1");
        for key in FieldKey::FILTERS {
            assert_eq!(first.get(key), "", "{} should be blank", key.as_str());
        }
    }

    #[test]
    fn read_returns_values_untrimmed() {
        let mut form = OrderForm::default();
        form.edit(FieldKey::Status, FieldEdit::Replace("  shipped ".to_owned()));
        form.edit(FieldKey::Status, FieldEdit::Insert('!'));
        assert_eq!(form.read().status, "  shipped !");

        form.edit(FieldKey::Status, FieldEdit::Backspace);
        assert_eq!(form.field(FieldKey::Status), "  shipped ");
    }

    #[test]
    fn display_date_handles_service_date_shapes() {
        assert_eq!(display_date("2024-01-05T00:00:00Z"), "2024-01-05");
        assert_eq!(display_date("2024-01-05T23:30:00-05:00"), "2024-01-05");
        assert_eq!(display_date("2024-01-05T08:15:30.123456"), "2024-01-05");
        assert_eq!(display_date("2024-01-05T08:15"), "2024-01-05");
        assert_eq!(display_date("2024-01-05 08:15:30+0000"), "2024-01-05");
        assert_eq!(display_date("2024-01-05"), "2024-01-05");
    }

    #[test]
    fn display_date_keeps_unparseable_and_blank_values() {
        assert_eq!(display_date(""), "");
        assert_eq!(display_date("   "), "");
        assert_eq!(display_date("next tuesday"), "next tuesday");
        assert_eq!(display_date("2024-13-40"), "2024-13-40");
    }
}
