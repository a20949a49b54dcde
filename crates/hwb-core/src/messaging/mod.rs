//! Outbound chat messaging.

pub mod notifier;
pub mod port;
