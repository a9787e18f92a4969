//! Common utilities for docview
//!
//! This crate provides the error taxonomy shared by every docview crate.

pub mod error;

pub use error::{DocViewError, Result};
