//! Errors that can occur when using this SDK

use thiserror::Error;

/// The access token passed to a login call was empty.
#[derive(Debug, Error)]
#[error("The access token must not be empty")]
pub struct EmptyTokenError;

/// The client has already been initialized.
#[derive(Debug, Error)]
#[error("The client is already initialized")]
pub struct AlreadyInitializedError;

/// Errors from [`Client::initialize`](crate::Client::initialize).
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum InitializeError {
    #[error(transparent)]
    RepositoryNotFound(#[from] medikit_state::registry::RepositoryNotFoundError),
    #[error(transparent)]
    AlreadyInitialized(#[from] AlreadyInitializedError),
}

/// Missing required field.
#[derive(Debug, Error)]
#[error("The response received was missing a required field: {0}")]
pub struct MissingFieldError(pub &'static str);

/// This macro is used to require that a value is present or return an error otherwise.
/// It is equivalent to using `val.ok_or(Error::MissingFields)?`, but easier to use and
/// with a more descriptive error message.
/// Note that this macro will return early from the function if the value is not present.
#[macro_export]
macro_rules! require {
    ($val:expr) => {
        match $val {
            Some(val) => val,
            None => return Err($crate::MissingFieldError(stringify!($val)).into()),
        }
    };
}
