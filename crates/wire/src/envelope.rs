// SPDX-License-Identifier: MIT

//! The outermost wire frame: a correlation id, agent metadata headers, and
//! a [`Message`] body.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Header carrying the sending agent's ip. Each outbound agent RPC
/// carries headers `agent-ip` and `agent-version`.
pub const HEADER_AGENT_IP: &str = "agent-ip";
pub const HEADER_AGENT_VERSION: &str = "agent-version";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: Uuid,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Message,
}

impl Envelope {
    pub fn new(body: impl Into<Message>) -> Self {
        Self { id: Uuid::new_v4(), headers: HashMap::new(), body: body.into() }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn agent_ip(&self) -> Option<&str> {
        self.headers.get(HEADER_AGENT_IP).map(String::as_str)
    }

    pub fn agent_version(&self) -> Option<&str> {
        self.headers.get(HEADER_AGENT_VERSION).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
