// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const SUCCESS_MESSAGE: &str = "Success";
pub const DELETED_MESSAGE: &str = "Order has been Deleted!";
pub const SERVER_ERROR_MESSAGE: &str = "Server error!";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    message: Option<String>,
}

impl Feedback {
    pub fn show(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
