#![doc = include_str!("../README.md")]

pub mod api;
pub mod client;
mod error;
pub mod session;
pub mod stores;

pub use client::{Client, StateClient};
pub use error::{AlreadyInitializedError, EmptyTokenError, InitializeError, MissingFieldError};
