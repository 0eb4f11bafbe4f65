// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use orderdesk_app::{FieldKey, FieldSet, KNOWN_STATUSES};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Request, Response, Server};
use url::Url;

const DEFAULT_ORDER_DATE: &str = "2024-01-01T00:00:00";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    // Path and query exactly as received.
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Store {
    orders: BTreeMap<i64, Map<String, Value>>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    unhealthy: Option<String>,
}

// Shuts down on drop.
pub struct MockOrderService {
    base_url: String,
    server: Arc<Server>,
    store: Arc<Mutex<Store>>,
    handle: Option<JoinHandle<()>>,
}

impl MockOrderService {
    pub fn start() -> Result<Self> {
        let server = Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock order service: {error}"))?;
        let server = Arc::new(server);
        let base_url = format!("http://{}", server.server_addr());
        let store = Arc::new(Mutex::new(Store {
            next_id: 1,
            ..Store::default()
        }));

        let handle = {
            let server = Arc::clone(&server);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle_request(&store, request);
                }
            })
        };

        Ok(Self {
            base_url,
            server,
            store,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn seed(&self, fields: &FieldSet) -> i64 {
        let mut store = lock(&self.store);
        let id = store.next_id;
        store.next_id += 1;
        let mut record = Map::new();
        // Seeds are trusted; fall back to the raw text if a value does not parse.
        if apply_fields(&mut record, &body_from_fields(fields), true).is_err() {
            record = body_from_fields(fields);
        }
        record.insert("order_id".to_owned(), json!(id));
        store.orders.insert(id, record);
        id
    }

    pub fn order(&self, id: i64) -> Option<Value> {
        lock(&self.store)
            .orders
            .get(&id)
            .map(|record| Value::Object(record.clone()))
    }

    pub fn order_count(&self) -> usize {
        lock(&self.store).orders.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.store).requests.clone()
    }

    pub fn set_unhealthy(&self, error: Option<&str>) {
        lock(&self.store).unhealthy = error.map(str::to_owned);
    }
}

impl Drop for MockOrderService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn lock(store: &Mutex<Store>) -> MutexGuard<'_, Store> {
    store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn handle_request(store: &Mutex<Store>, mut request: Request) {
    let method = request.method().as_str().to_owned();
    let raw_url = request.url().to_owned();
    let content_type = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Content-Type"))
        .map(|header| header.value.as_str().to_owned());
    let mut raw_body = String::new();
    let _ = request.as_reader().read_to_string(&mut raw_body);
    let body = serde_json::from_str::<Value>(&raw_body).ok();

    let (status, payload) = {
        let mut store = lock(store);
        store.requests.push(RecordedRequest {
            method: method.clone(),
            url: raw_url.clone(),
            content_type,
            body: body.clone(),
        });
        route(&mut store, &method, &raw_url, body)
    };

    let response = Response::from_string(payload.to_string())
        .with_status_code(status)
        .with_header(json_header());
    let _ = request.respond(response);
}

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

fn route(store: &mut Store, method: &str, raw_url: &str, body: Option<Value>) -> (u16, Value) {
    let Ok(url) = Url::parse(&format!("http://mock{raw_url}")) else {
        return not_found("Not Found");
    };
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    match (method, segments.as_slice()) {
        ("GET", ["health"]) => health(store),
        ("GET", ["orders"]) => search(store, &url),
        ("POST", ["orders"]) => create(store, body),
        ("GET", ["orders", id]) => with_order(store, id, |store, id| {
            (200, Value::Object(store.orders[&id].clone()))
        }),
        ("PUT", ["orders", id]) => {
            with_order(store, id, |store, id| update(store, id, body.as_ref()))
        }
        ("DELETE", ["orders", id]) => with_order(store, id, |store, id| {
            store.orders.remove(&id);
            (200, json!({ "message": "Order successfully deleted" }))
        }),
        ("PUT", ["orders", id, "ship"]) => {
            with_order(store, id, |store, id| ship(store, id, body.as_ref()))
        }
        _ => not_found("Not Found"),
    }
}

fn with_order(
    store: &mut Store,
    raw_id: &str,
    action: impl FnOnce(&mut Store, i64) -> (u16, Value),
) -> (u16, Value) {
    // Non-integer ids never match a route, same as an `<int:...>` converter.
    let Ok(id) = raw_id.parse::<i64>() else {
        return not_found("Not Found");
    };
    if !store.orders.contains_key(&id) {
        return not_found("Order not found");
    }
    action(store, id)
}

fn health(store: &Store) -> (u16, Value) {
    match &store.unhealthy {
        Some(error) => (500, json!({ "status": "unhealthy", "error": error })),
        None => (
            200,
            json!({ "status": "healthy", "order_amount": store.orders.len() }),
        ),
    }
}

fn create(store: &mut Store, body: Option<Value>) -> (u16, Value) {
    let Some(Value::Object(body)) = body else {
        return bad_request("Invalid order: body of request contained bad or no data");
    };
    let mut record = Map::new();
    if let Err(message) = apply_fields(&mut record, &body, true) {
        return bad_request(&message);
    }
    let id = store.next_id;
    store.next_id += 1;
    record.insert("order_id".to_owned(), json!(id));
    store.orders.insert(id, record.clone());
    (201, Value::Object(record))
}

fn update(store: &mut Store, id: i64, body: Option<&Value>) -> (u16, Value) {
    let Some(Value::Object(body)) = body else {
        return bad_request("Invalid order: body of request contained bad or no data");
    };
    let mut record = store.orders[&id].clone();
    if let Err(message) = apply_fields(&mut record, body, false) {
        return bad_request(&message);
    }
    store.orders.insert(id, record.clone());
    (200, Value::Object(record))
}

fn ship(store: &mut Store, id: i64, body: Option<&Value>) -> (u16, Value) {
    let tracking = body
        .and_then(|body| body.get("tracking_number"))
        .filter(|value| !value.is_null());
    let Some(tracking) = tracking else {
        return bad_request("Tracking number is required to ship an order");
    };
    let Some(record) = store.orders.get_mut(&id) else {
        return not_found("Order not found");
    };
    record.insert("status".to_owned(), json!("shipped"));
    record.insert("tracking_number".to_owned(), tracking.clone());
    (200, Value::Object(record.clone()))
}

// Only the first filter present applies.
fn search(store: &Store, url: &Url) -> (u16, Value) {
    let params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
    let precedence = [
        FieldKey::CustomerId,
        FieldKey::OrderDate,
        FieldKey::Status,
        FieldKey::TrackingNumber,
        FieldKey::DiscountAmount,
    ];
    let filter = precedence
        .into_iter()
        .find_map(|key| params.get(key.as_str()).map(|value| (key, value.as_str())));

    let matches = store
        .orders
        .values()
        .filter(|record| match filter {
            None => true,
            Some((key, wanted)) => field_matches(record, key, wanted),
        })
        .map(|record| Value::Object(record.clone()))
        .collect::<Vec<_>>();
    (200, Value::Array(matches))
}

fn field_matches(record: &Map<String, Value>, key: FieldKey, wanted: &str) -> bool {
    let stored = record.get(key.as_str()).map(text).unwrap_or_default();
    match key {
        FieldKey::Status => stored.eq_ignore_ascii_case(wanted),
        FieldKey::OrderDate => stored == normalize_date(wanted),
        FieldKey::DiscountAmount => match (stored.parse::<f64>(), wanted.parse::<f64>()) {
            (Ok(left), Ok(right)) => (left - right).abs() < f64::EPSILON,
            _ => false,
        },
        _ => stored == wanted,
    }
}

fn body_from_fields(fields: &FieldSet) -> Map<String, Value> {
    FieldKey::FILTERS
        .into_iter()
        .map(|key| (key.as_str().to_owned(), json!(fields.get(key))))
        .collect()
}

fn apply_fields(
    record: &mut Map<String, Value>,
    body: &Map<String, Value>,
    defaults: bool,
) -> Result<(), String> {
    let given = |name: &str| {
        body.get(name)
            .map(text)
            .filter(|value| !value.is_empty())
    };

    match given("customer_id") {
        Some(value) => {
            record.insert("customer_id".to_owned(), json!(value));
        }
        None if defaults => {
            return Err("Invalid order: missing customer_id".to_owned());
        }
        None => {}
    }

    match given("status") {
        Some(value) => {
            let status = value.to_ascii_lowercase();
            if !KNOWN_STATUSES.contains(&status.as_str()) {
                return Err(format!("Invalid status: {value}"));
            }
            record.insert("status".to_owned(), json!(status));
        }
        None if defaults => {
            record.insert("status".to_owned(), json!("pending"));
        }
        None => {}
    }

    match given("order_date") {
        Some(value) => {
            record.insert("order_date".to_owned(), json!(normalize_date(&value)));
        }
        None if defaults => {
            record.insert("order_date".to_owned(), json!(DEFAULT_ORDER_DATE));
        }
        None => {}
    }

    match given("discount_amount") {
        Some(value) => {
            let amount = value
                .parse::<f64>()
                .map_err(|_| format!("could not convert string to float: '{value}'"))?;
            record.insert("discount_amount".to_owned(), json!(amount));
        }
        None if defaults => {
            record.insert("discount_amount".to_owned(), json!(0.0));
        }
        None => {}
    }

    match given("tracking_number") {
        Some(value) => {
            record.insert("tracking_number".to_owned(), json!(value));
        }
        None if defaults => {
            record.insert("tracking_number".to_owned(), Value::Null);
        }
        None => {}
    }

    Ok(())
}

fn normalize_date(value: &str) -> String {
    if value.len() == 10 {
        format!("{value}T00:00:00")
    } else {
        value.to_owned()
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn not_found(message: &str) -> (u16, Value) {
    (
        404,
        json!({ "status": 404, "error": "Not Found", "message": message }),
    )
}

fn bad_request(message: &str) -> (u16, Value) {
    (
        400,
        json!({ "status": 400, "error": "Bad Request", "message": message }),
    )
}
