//! Types stored in the visitor's session.

pub mod session;
