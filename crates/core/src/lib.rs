//! Member Signup Core - Domain types and form logic.
//!
//! This crate provides everything the signup page needs that does not touch
//! the network. It is shared by:
//! - `signup` - The web binary serving the registration form
//! - `cli` - Command-line tools for masks, lookups and manual submissions
//!
//! # Architecture
//!
//! The core crate contains only types and state machines - no I/O, no HTTP
//! clients. External lookups and the registration API are driven by the web
//! crate, which feeds their results back through [`form::FormSession`].
//!
//! # Modules
//!
//! - [`mask`] - Display masks for document, phone, mobile and postal code fields
//! - [`referrer`] - Representative directory and URL path resolution
//! - [`catalog`] - Operators, plans and the state list
//! - [`draft`] - The in-progress form record and its fields
//! - [`form`] - Form session state machine (changes, lookups, submission)
//! - [`lookup`] - Response contracts of the address and identity lookups
//! - [`payload`] - Registration payload sent to the remote API
//! - [`types`] - Newtype wrappers for emails and digit-only identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod draft;
pub mod form;
pub mod lookup;
pub mod mask;
pub mod payload;
pub mod referrer;
pub mod types;

pub use catalog::{Operator, Plan, PlanCatalog, STATES};
pub use draft::{ChipType, Draft, Field, FieldError, ShippingType};
pub use form::{
    FAILURE_MESSAGE, Feedback, FormError, FormSession, LookupTicket, Phase, SUCCESS_MESSAGE,
    SubmissionOutcome, SubmissionTicket,
};
pub use lookup::{AddressFields, AddressLookupResponse, IdentityFields, IdentityLookupResponse};
pub use mask::{MaskKind, unmask};
pub use payload::RegistrationPayload;
pub use referrer::{Referrer, ReferrerDirectory, ResolveError};
pub use types::*;
