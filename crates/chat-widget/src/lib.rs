//! Headless core of the Kiki portfolio chat widget.
//!
//! Owns everything a rendering layer should not: device identity, session and
//! message stores with keyset pagination, optimistic message delivery over a
//! pluggable completion transport, and the scroll-position bookkeeping that
//! keeps history backfill visually stable.
//!
//! [`ChatController`] ties the pieces together; a UI drives it and renders
//! from its accessors.

pub mod controller;
pub mod device;
pub mod error;
pub mod fetch;
pub mod messages;
pub mod sessions;
pub mod transport;
pub mod viewport;

pub use controller::{ChatController, ScrollEffect, SendOutcome};
pub use device::DeviceIdentity;
pub use error::WidgetError;
pub use fetch::FetchState;
pub use messages::{Delivery, LogEntry, MessageStore, MESSAGE_PAGE_SIZE};
pub use sessions::{SessionStore, SESSION_PAGE_SIZE};
pub use transport::{
    CompletionRequest, CompletionResponse, CompletionTransport, HttpCompletionClient,
    TransportError,
};
pub use viewport::{ScrollCommand, ScrollMetrics, ScrollTranslator};
