//! Core types for the signup form.
//!
//! This module provides type-safe wrappers for validated form values.

pub mod digits;
pub mod email;

pub use digits::{DigitsError, DocumentNumber, PostalCode};
pub use email::{Email, EmailError};
