//! Port definitions (interfaces for external adapters)

pub mod agent_client;
pub mod event_publisher;
