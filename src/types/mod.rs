//! Shared types

mod error;

pub use error::{ErrorBody, Result, TurnstileError};
