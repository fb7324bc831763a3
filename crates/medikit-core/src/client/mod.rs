//! The client state container and its accessors.

#[allow(clippy::module_inception)]
mod client;
mod state_client;

pub use client::Client;
pub use state_client::StateClient;
