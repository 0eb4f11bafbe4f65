// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use orderdesk_app::{OrderRequest, Reply};
use orderdesk_client::Client;
use orderdesk_tui::{InternalEvent, OrderRuntime};
use std::sync::mpsc::Sender;
use std::thread;

pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl OrderRuntime for HttpRuntime {
    fn execute(&mut self, request: &OrderRequest) -> Reply {
        self.client.send(request)
    }

    fn spawn_request(
        &mut self,
        request_id: u64,
        request: OrderRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("order-request-{request_id}"))
            .spawn(move || {
                let reply = client.send(&request);
                // The UI may already be gone; nothing is left to notify.
                let _ = tx.send(InternalEvent::Completed { request_id, reply });
            })
            .context("spawn order request worker")?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.client.base_url().to_owned()
    }
}
