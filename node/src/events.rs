//! Events published by the cooperative for subscribers.

use cbank_governance::GovernanceEvent;
use cbank_membership::RegistryEvent;
use cbank_pool::PoolEvent;
use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Component events, tagged with their source, that observers receive via the
/// [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "event", rename_all = "snake_case")]
pub enum ProtocolEvent {
    Registry(RegistryEvent),
    Governance(GovernanceEvent),
    Pool(PoolEvent),
}

impl ProtocolEvent {
    pub fn source(&self) -> &'static str {
        match self {
            Self::Registry(_) => "registry",
            Self::Governance(_) => "governance",
            Self::Pool(_) => "pool",
        }
    }

    /// One-line JSON form, for event logs.
    pub fn to_json(&self) -> Result<String, NodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline, in subscription order, after the operation
/// that produced the event has completed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ProtocolEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ProtocolEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &ProtocolEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
