// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use orderdesk_app::{
    DELETED_MESSAGE, DeskEvent, DeskState, FieldEdit, FieldKey, FieldSet, SERVER_ERROR_MESSAGE,
    SUCCESS_MESSAGE, Trigger,
};
use orderdesk_client::Client;
use orderdesk_testkit::{MockOrderService, OrderFaker};
use std::time::Duration;

struct Session {
    service: MockOrderService,
    client: Client,
    state: DeskState,
}

impl Session {
    fn start() -> Result<Self> {
        let service = MockOrderService::start()?;
        let client = Client::new(service.base_url(), Duration::from_secs(2))?;
        Ok(Self {
            service,
            client,
            state: DeskState::default(),
        })
    }

    fn fill(&mut self, fields: &FieldSet) {
        for key in FieldKey::ALL {
            self.state
                .edit(key, FieldEdit::Replace(fields.get(key).to_owned()));
        }
    }

    fn set(&mut self, key: FieldKey, value: &str) {
        self.state.edit(key, FieldEdit::Replace(value.to_owned()));
    }

    fn press(&mut self, trigger: Trigger) -> Result<Vec<DeskEvent>> {
        let events = self.state.trigger(trigger);
        let started = events.into_iter().find_map(|event| match event {
            DeskEvent::RequestStarted {
                request_id,
                request,
            } => Some((request_id, request)),
            _ => None,
        });
        let Some((request_id, request)) = started else {
            return Ok(Vec::new());
        };
        let reply = self.client.send(&request);
        let events = self.state.complete(request_id, reply);
        if events
            .iter()
            .any(|event| matches!(event, DeskEvent::StaleCompletionDropped { .. }))
        {
            return Err(anyhow!("completion unexpectedly dropped"));
        }
        Ok(events)
    }

    fn message(&self) -> Option<&str> {
        self.state.feedback.message()
    }

    fn field(&self, key: FieldKey) -> &str {
        self.state.form.field(key)
    }
}

#[test]
fn create_then_retrieve_round_trips_every_field() -> Result<()> {
    let mut session = Session::start()?;
    let mut faker = OrderFaker::new(11);
    let mut fields = faker.order_fields();
    fields.status = "pending".to_owned();
    fields.tracking_number.clear();
    session.fill(&fields);

    session.press(Trigger::Create)?;
    assert_eq!(session.message(), Some(SUCCESS_MESSAGE));
    let order_id = session.field(FieldKey::OrderId).to_owned();
    assert_eq!(order_id, "1");
    assert_eq!(session.field(FieldKey::OrderDate), fields.order_date);

    session.press(Trigger::Clear)?;
    assert!(session.state.form.read() == FieldSet::default());

    session.set(FieldKey::OrderId, &order_id);
    session.press(Trigger::Retrieve)?;
    assert_eq!(session.message(), Some(SUCCESS_MESSAGE));
    assert_eq!(session.field(FieldKey::CustomerId), fields.customer_id);
    assert_eq!(session.field(FieldKey::Status), "pending");
    assert_eq!(session.field(FieldKey::OrderDate), fields.order_date);
    assert_eq!(
        session.field(FieldKey::DiscountAmount).parse::<f64>()?,
        fields.discount_amount.parse::<f64>()?
    );
    assert_eq!(session.field(FieldKey::TrackingNumber), "");
    Ok(())
}

#[test]
fn update_changes_the_stored_order() -> Result<()> {
    let mut session = Session::start()?;
    let mut faker = OrderFaker::new(5);
    let id = session.service.seed(&faker.order_fields());

    session.set(FieldKey::OrderId, &id.to_string());
    session.press(Trigger::Retrieve)?;
    session.set(FieldKey::Status, "processing");
    session.press(Trigger::Update)?;

    assert_eq!(session.message(), Some(SUCCESS_MESSAGE));
    assert_eq!(session.field(FieldKey::Status), "processing");
    let stored = session
        .service
        .order(id)
        .ok_or_else(|| anyhow!("order {id} should still exist"))?;
    assert_eq!(stored["status"], "processing");
    Ok(())
}

#[test]
fn delete_clears_form_but_keeps_order_id() -> Result<()> {
    let mut session = Session::start()?;
    let mut faker = OrderFaker::new(9);
    let id = session.service.seed(&faker.order_fields());

    session.set(FieldKey::OrderId, &id.to_string());
    session.press(Trigger::Retrieve)?;
    session.press(Trigger::Delete)?;

    assert_eq!(session.message(), Some(DELETED_MESSAGE));
    assert_eq!(session.field(FieldKey::OrderId), id.to_string());
    assert_eq!(session.field(FieldKey::CustomerId), "");
    assert_eq!(session.service.order_count(), 0);

    session.press(Trigger::Delete)?;
    assert_eq!(session.message(), Some(SERVER_ERROR_MESSAGE));
    Ok(())
}

#[test]
fn retrieve_missing_order_shows_service_message_and_clears_form() -> Result<()> {
    let mut session = Session::start()?;
    session.fill(&FieldSet {
        order_id: "404".to_owned(),
        customer_id: "C1".to_owned(),
        status: "pending".to_owned(),
        ..FieldSet::default()
    });

    session.press(Trigger::Retrieve)?;
    assert_eq!(session.message(), Some("Order not found"));
    assert_eq!(session.field(FieldKey::OrderId), "404");
    assert_eq!(session.field(FieldKey::CustomerId), "");
    assert_eq!(session.field(FieldKey::Status), "");
    Ok(())
}

#[test]
fn create_with_unknown_status_keeps_form_and_shows_message() -> Result<()> {
    let mut session = Session::start()?;
    let fields = FieldSet {
        customer_id: "C1".to_owned(),
        status: "NEW".to_owned(),
        ..FieldSet::default()
    };
    session.fill(&fields);

    session.press(Trigger::Create)?;
    assert_eq!(session.message(), Some("Invalid status: NEW"));
    assert_eq!(session.state.form.read(), fields);
    assert_eq!(session.service.order_count(), 0);
    Ok(())
}

#[test]
fn search_renders_every_match_and_fills_form_with_first() -> Result<()> {
    let mut session = Session::start()?;
    let mut faker = OrderFaker::new(21);
    let mut ids = Vec::new();
    for _ in 0..3 {
        let mut fields = faker.order_fields();
        fields.customer_id = "4242".to_owned();
        ids.push(session.service.seed(&fields));
    }
    let mut other = faker.order_fields();
    other.customer_id = "1111".to_owned();
    session.service.seed(&other);

    session.set(FieldKey::CustomerId, "4242");
    let events = session.press(Trigger::Search)?;

    assert!(events.contains(&DeskEvent::ResultsRendered { rows: 3 }));
    assert_eq!(session.message(), Some(SUCCESS_MESSAGE));
    let rows = session.state.results.rows();
    assert_eq!(rows.len(), 3);
    for (row, id) in rows.iter().zip(&ids) {
        assert_eq!(row.cells[0], id.to_string());
        assert_eq!(row.cells[1], "4242");
    }
    assert_eq!(session.field(FieldKey::OrderId), ids[0].to_string());

    let requests = session.service.requests();
    let last = requests.last().ok_or_else(|| anyhow!("search request expected"))?;
    assert_eq!(last.url, "/orders?customer_id=4242");
    Ok(())
}

#[test]
fn empty_search_result_keeps_form_untouched() -> Result<()> {
    let mut session = Session::start()?;
    session.set(FieldKey::CustomerId, "nobody");
    let events = session.press(Trigger::Search)?;

    assert!(events.contains(&DeskEvent::ResultsRendered { rows: 0 }));
    assert!(session.state.results.is_empty());
    assert_eq!(session.field(FieldKey::CustomerId), "nobody");
    assert_eq!(session.message(), Some(SUCCESS_MESSAGE));
    Ok(())
}

#[test]
fn ship_marks_order_shipped_with_tracking_number() -> Result<()> {
    let mut session = Session::start()?;
    let id = session.service.seed(&FieldSet {
        customer_id: "C9".to_owned(),
        status: "processing".to_owned(),
        ..FieldSet::default()
    });

    session.set(FieldKey::OrderId, &id.to_string());
    session.set(FieldKey::TrackingNumber, "1Z0001");
    session.press(Trigger::Ship)?;

    assert_eq!(session.message(), Some(SUCCESS_MESSAGE));
    assert_eq!(session.field(FieldKey::Status), "shipped");
    assert_eq!(session.field(FieldKey::TrackingNumber), "1Z0001");
    assert_eq!(session.field(FieldKey::CustomerId), "C9");
    Ok(())
}

#[test]
fn requests_send_json_content_type() -> Result<()> {
    let mut session = Session::start()?;
    session.set(FieldKey::OrderId, "1");
    session.press(Trigger::Retrieve)?;
    session.press(Trigger::Delete)?;

    for request in session.service.requests() {
        assert_eq!(
            request.content_type.as_deref(),
            Some("application/json"),
            "{} {}",
            request.method,
            request.url
        );
    }
    Ok(())
}

#[test]
fn health_reflects_mock_service_state() -> Result<()> {
    let session = Session::start()?;
    session.service.seed(&FieldSet {
        customer_id: "C1".to_owned(),
        ..FieldSet::default()
    });

    let health = session.client.health()?;
    assert!(health.healthy);
    assert_eq!(health.order_amount, Some(1));

    session.service.set_unhealthy(Some("database is down"));
    let health = session.client.health()?;
    assert!(!health.healthy);
    assert_eq!(health.error.as_deref(), Some("database is down"));
    Ok(())
}
