// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;

use crate::{
    DELETED_MESSAGE, DeskEvent, DeskState, FieldSet, Operation, Order, SERVER_ERROR_MESSAGE,
    SUCCESS_MESSAGE, build_query,
};

pub const ORDERS_PATH: &str = "orders";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    Record,
    Records,
    Ignored,
}

// `order_id` never travels in a body; it is part of the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Order {
        customer_id: String,
        status: String,
        order_date: String,
        discount_amount: String,
        tracking_number: String,
    },
    Ship {
        tracking_number: String,
    },
}

impl RequestBody {
    pub fn order(fields: &FieldSet) -> Self {
        Self::Order {
            customer_id: fields.customer_id.clone(),
            status: fields.status.clone(),
            order_date: fields.order_date.clone(),
            discount_amount: fields.discount_amount.clone(),
            tracking_number: fields.tracking_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub operation: Operation,
    pub method: Method,
    // Unescaped; the transport encodes each segment.
    pub segments: Vec<String>,
    pub query: Option<String>,
    pub body: Option<RequestBody>,
}

impl OrderRequest {
    // Nothing is validated; an empty `order_id` still produces a request.
    pub fn build(operation: Operation, fields: &FieldSet) -> Self {
        let item_segments = || vec![ORDERS_PATH.to_owned(), fields.order_id.clone()];
        match operation {
            Operation::Create => Self {
                operation,
                method: Method::Post,
                segments: vec![ORDERS_PATH.to_owned()],
                query: None,
                body: Some(RequestBody::order(fields)),
            },
            Operation::Update => Self {
                operation,
                method: Method::Put,
                segments: item_segments(),
                query: None,
                body: Some(RequestBody::order(fields)),
            },
            Operation::Retrieve => Self {
                operation,
                method: Method::Get,
                segments: item_segments(),
                query: None,
                body: None,
            },
            Operation::Delete => Self {
                operation,
                method: Method::Delete,
                segments: item_segments(),
                query: None,
                body: None,
            },
            Operation::Search => {
                let query = build_query(fields);
                Self {
                    operation,
                    method: Method::Get,
                    segments: vec![ORDERS_PATH.to_owned()],
                    query: (!query.is_empty()).then_some(query),
                    body: None,
                }
            }
            Operation::Ship => {
                let mut segments = item_segments();
                segments.push("ship".to_owned());
                Self {
                    operation,
                    method: Method::Put,
                    segments,
                    query: None,
                    body: Some(RequestBody::Ship {
                        tracking_number: fields.tracking_number.clone(),
                    }),
                }
            }
        }
    }

    pub const fn reply_shape(&self) -> ReplyShape {
        match self.operation {
            Operation::Create | Operation::Update | Operation::Retrieve | Operation::Ship => {
                ReplyShape::Record
            }
            Operation::Search => ReplyShape::Records,
            Operation::Delete => ReplyShape::Ignored,
        }
    }

    pub fn target(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Record(Order),
    Records(Vec<Order>),
    Done,
    Rejected { status: u16, message: Option<String> },
    // Also a 2xx whose body did not decode.
    Unreachable { error: String },
}

impl Reply {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Records(_) | Self::Done)
    }
}

impl DeskState {
    pub(crate) fn settle(&mut self, operation: Operation, reply: Reply) -> Vec<DeskEvent> {
        let mut events = Vec::new();
        match (operation, reply) {
            (Operation::Search, Reply::Records(orders)) => {
                let first = self.results.render(&orders);
                events.push(DeskEvent::ResultsRendered { rows: orders.len() });
                if let Some(first) = first {
                    self.form.write(&first);
                    events.push(DeskEvent::FormChanged);
                }
                events.push(self.show(SUCCESS_MESSAGE));
            }
            (
                Operation::Create | Operation::Update | Operation::Retrieve | Operation::Ship,
                Reply::Record(order),
            ) => {
                self.form.write(&order);
                events.push(DeskEvent::FormChanged);
                events.push(self.show(SUCCESS_MESSAGE));
            }
            (Operation::Delete, Reply::Done) => {
                self.form.clear();
                events.push(DeskEvent::FormChanged);
                events.push(self.show(DELETED_MESSAGE));
            }
            (Operation::Delete, failure) => {
                log_failure(operation, &failure);
                events.push(self.show(SERVER_ERROR_MESSAGE));
            }
            (Operation::Retrieve, failure) => {
                log_failure(operation, &failure);
                self.form.clear();
                events.push(DeskEvent::FormChanged);
                events.push(self.show(&failure_message(failure)));
            }
            (_, failure) => {
                log_failure(operation, &failure);
                events.push(self.show(&failure_message(failure)));
            }
        }
        events
    }

    fn show(&mut self, text: &str) -> DeskEvent {
        self.feedback.show(text);
        DeskEvent::FeedbackChanged(Some(text.to_owned()))
    }
}

fn failure_message(reply: Reply) -> String {
    match reply {
        Reply::Rejected {
            message: Some(message),
            ..
        } => message,
        _ => SERVER_ERROR_MESSAGE.to_owned(),
    }
}

fn log_failure(operation: Operation, reply: &Reply) {
    match reply {
        Reply::Rejected { status, message } => tracing::info!(
            operation = operation.label(),
            status,
            message = message.as_deref().unwrap_or(""),
            "order request rejected"
        ),
        Reply::Unreachable { error } => tracing::warn!(
            operation = operation.label(),
            %error,
            "order service unreachable"
        ),
        other => tracing::warn!(
            operation = operation.label(),
            reply = ?other,
            "reply shape does not match operation"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{Method, OrderRequest, ReplyShape};
    use crate::{FieldSet, Operation};
    use serde_json::{Value, json};

    fn body_json(request: &OrderRequest) -> Value {
        serde_json::to_value(&request.body).expect("encode request body")
    }

    fn fields() -> FieldSet {
        FieldSet {
            order_id: "O1".to_owned(),
            customer_id: "C1".to_owned(),
            status: "NEW".to_owned(),
            order_date: "2024-01-05".to_owned(),
            discount_amount: "0".to_owned(),
            tracking_number: String::new(),
        }
    }

    #[test]
    fn create_posts_body_without_order_id() {
        let request = OrderRequest::build(Operation::Create, &fields());
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.target(), "/orders");
        assert_eq!(
            body_json(&request),
            json!({
                "customer_id": "C1",
                "status": "NEW",
                "order_date": "2024-01-05",
                "discount_amount": "0",
                "tracking_number": "",
            })
        );
        assert_eq!(request.reply_shape(), ReplyShape::Record);
    }

    #[test]
    fn update_carries_id_in_path_only() {
        let request = OrderRequest::build(Operation::Update, &fields());
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.segments, vec!["orders", "O1"]);
        let body = body_json(&request);
        assert!(body.get("order_id").is_none());
        assert_eq!(body["customer_id"], "C1");
    }

    #[test]
    fn item_requests_are_sent_even_without_id() {
        let mut blank = fields();
        blank.order_id.clear();
        for operation in [Operation::Retrieve, Operation::Delete] {
            let request = OrderRequest::build(operation, &blank);
            assert_eq!(request.target(), "/orders/");
            assert!(request.body.is_none());
        }
    }

    #[test]
    fn search_uses_query_and_expects_records() {
        let mut filters = FieldSet {
            customer_id: "C1".to_owned(),
            ..FieldSet::default()
        };
        let request = OrderRequest::build(Operation::Search, &filters);
        assert_eq!(request.target(), "/orders?customer_id=C1");
        assert_eq!(request.reply_shape(), ReplyShape::Records);

        filters.customer_id.clear();
        let list_all = OrderRequest::build(Operation::Search, &filters);
        assert_eq!(list_all.query, None);
        assert_eq!(list_all.target(), "/orders");
    }

    #[test]
    fn ship_sends_tracking_number_to_ship_endpoint() {
        let mut values = fields();
        values.tracking_number = "TRK1".to_owned();
        let request = OrderRequest::build(Operation::Ship, &values);
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.target(), "/orders/O1/ship");
        assert_eq!(body_json(&request), json!({ "tracking_number": "TRK1" }));
    }

    #[test]
    fn delete_ignores_reply_body() {
        let request = OrderRequest::build(Operation::Delete, &fields());
        assert_eq!(request.method.as_str(), "DELETE");
        assert_eq!(request.reply_shape(), ReplyShape::Ignored);
    }
}
