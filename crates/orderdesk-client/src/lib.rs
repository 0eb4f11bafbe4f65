// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use orderdesk_app::{Method, Order, OrderRequest, Reply, ReplyShape};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub healthy: bool,
    pub order_amount: Option<i64>,
    pub error: Option<String>,
}

// Clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("service.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("service.base_url {trimmed:?} is not a valid URL"))?;
        if base_url.cannot_be_a_base() {
            bail!("service.base_url {trimmed:?} must be an http(s) URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn send(&self, request: &OrderRequest) -> Reply {
        match self.execute(request) {
            Ok(reply) => reply,
            Err(error) => Reply::Unreachable {
                error: format!("{error:#}"),
            },
        }
    }

    // Non-2xx statuses are replies, not errors.
    pub fn execute(&self, request: &OrderRequest) -> Result<Reply> {
        let url = self.endpoint(&request.segments, request.query.as_deref())?;
        tracing::debug!(
            operation = request.operation.label(),
            method = request.method.as_str(),
            %url,
            "sending order request"
        );

        let mut builder = self
            .builder(request.method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        tracing::debug!(
            operation = request.operation.label(),
            status = status.as_u16(),
            "order service replied"
        );
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Ok(rejected(status, &body));
        }

        match request.reply_shape() {
            ReplyShape::Record => {
                let order: Order = response.json().context("decode order record")?;
                Ok(Reply::Record(order))
            }
            ReplyShape::Records => {
                let orders: Vec<Order> = response.json().context("decode order list")?;
                Ok(Reply::Records(orders))
            }
            ReplyShape::Ignored => Ok(Reply::Done),
        }
    }

    pub fn health(&self) -> Result<Health> {
        let url = self.endpoint(&["health".to_owned()], None)?;
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        let body = response.text().context("read health response")?;
        let parsed: HealthResponse = serde_json::from_str(&body).map_err(|_| {
            anyhow!(
                "health check returned {} with a non-JSON body -- is {} the order service?",
                status.as_u16(),
                self.base_url()
            )
        })?;

        Ok(Health {
            healthy: status.is_success() && parsed.status == "healthy",
            order_amount: parsed.order_amount,
            error: parsed.error,
        })
    }

    fn endpoint(&self, segments: &[String], query: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("base URL {} cannot carry a path", self.base_url()))?
            .pop_if_empty()
            .extend(segments);
        url.set_query(query);
        Ok(url)
    }

    fn builder(&self, method: Method, url: Url) -> RequestBuilder {
        match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        }
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach order service at {} -- check [service].base_url or ORDERDESK_BASE_URL ({})",
        base_url,
        error
    )
}

fn rejected(status: StatusCode, body: &str) -> Reply {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|parsed| parsed.message);
    Reply::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    order_amount: Option<i64>,
    error: Option<String>,
}
