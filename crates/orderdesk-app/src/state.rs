// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    Feedback, FieldEdit, FieldKey, Operation, OrderForm, OrderRequest, Reply, ResultsTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Create,
    Update,
    Retrieve,
    Delete,
    Search,
    Ship,
    Clear,
}

impl Trigger {
    pub const fn operation(self) -> Option<Operation> {
        match self {
            Self::Create => Some(Operation::Create),
            Self::Update => Some(Operation::Update),
            Self::Retrieve => Some(Operation::Retrieve),
            Self::Delete => Some(Operation::Delete),
            Self::Search => Some(Operation::Search),
            Self::Ship => Some(Operation::Ship),
            Self::Clear => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub request_id: u64,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeskEvent {
    // Hand `request` to a transport and report back through `complete` with
    // the same id.
    RequestStarted {
        request_id: u64,
        request: OrderRequest,
    },
    StaleCompletionDropped {
        request_id: u64,
    },
    FormChanged,
    FeedbackChanged(Option<String>),
    ResultsRendered {
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeskState {
    pub form: OrderForm,
    pub feedback: Feedback,
    pub results: ResultsTable,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

impl DeskState {
    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    pub fn trigger(&mut self, trigger: Trigger) -> Vec<DeskEvent> {
        let request_id = self.advance_generation();
        self.feedback.clear();
        let mut events = vec![DeskEvent::FeedbackChanged(None)];

        let Some(operation) = trigger.operation() else {
            self.in_flight = None;
            self.form.clear_order_id();
            self.form.clear();
            events.push(DeskEvent::FormChanged);
            return events;
        };

        let request = OrderRequest::build(operation, &self.form.read());
        tracing::debug!(
            request_id,
            operation = operation.label(),
            method = request.method.as_str(),
            target = %request.target(),
            "order request started"
        );
        self.in_flight = Some(InFlight {
            request_id,
            operation,
        });
        events.push(DeskEvent::RequestStarted {
            request_id,
            request,
        });
        events
    }

    // Completions for anything but the newest request are dropped untouched.
    pub fn complete(&mut self, request_id: u64, reply: Reply) -> Vec<DeskEvent> {
        let Some(in_flight) = self.in_flight else {
            return drop_stale(request_id, &reply);
        };
        if in_flight.request_id != request_id {
            return drop_stale(request_id, &reply);
        }

        self.in_flight = None;
        let succeeded = reply.is_success();
        let events = self.settle(in_flight.operation, reply);
        tracing::debug!(
            request_id,
            operation = in_flight.operation.label(),
            succeeded,
            "order request settled"
        );
        events
    }

    pub fn edit(&mut self, key: FieldKey, edit: FieldEdit) -> Vec<DeskEvent> {
        self.form.edit(key, edit);
        vec![DeskEvent::FormChanged]
    }

    fn advance_generation(&mut self) -> u64 {
        self.next_request_id = self.next_request_id.saturating_add(1);
        self.next_request_id
    }
}

// A superseded request may still have changed the service, so a returned
// record is logged with its id.
fn drop_stale(request_id: u64, reply: &Reply) -> Vec<DeskEvent> {
    match reply {
        Reply::Record(order) => tracing::info!(
            request_id,
            order_id = %order.id_text(),
            "dropping superseded completion that returned an order"
        ),
        _ => tracing::debug!(request_id, "dropping stale order completion"),
    }
    vec![DeskEvent::StaleCompletionDropped { request_id }]
}
