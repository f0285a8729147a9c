//! The content oracle.
//!
//! Everything model-facing lives here: the HTTP client, the prompts,
//! and the defensive JSON extraction for responses. The rest of the
//! crate treats the oracle as opaque; its output is validated like any
//! other untrusted input before it can touch the filesystem.

pub mod client;
pub mod json_parser;
pub mod prompts;

pub use client::*;
