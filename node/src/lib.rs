//! Cooperative orchestration: wires the registry, pool and governor together.
//!
//! The node crate is the external sequencing substrate the components assume:
//! - [`bootstrap`] runs the deployment sequence and hands authority to the governor
//! - [`Cooperative`] applies one operation at a time and publishes the resulting events
//! - [`Components`] executes governance batches all-or-nothing

pub mod bootstrap;
pub mod config;
pub mod cooperative;
pub mod error;
pub mod events;
pub mod executor;
pub mod logging;

pub use bootstrap::bootstrap;
pub use config::CoopConfig;
pub use cooperative::{CoopSummary, Cooperative};
pub use error::NodeError;
pub use events::{EventBus, ProtocolEvent};
pub use executor::Components;
pub use logging::{init_logging, LogFormat};
