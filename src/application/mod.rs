//! Application layer containing the purchase flow orchestration.
//!
//! `state` holds the pure transition function; `flow` holds the
//! `PurchaseFlowController` that executes the effects it returns against the
//! injected ports, spawning the post-purchase work as independent `tokio` tasks.

pub mod flow;
pub mod state;
