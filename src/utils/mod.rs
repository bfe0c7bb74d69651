//! Utility functions for code generation, URL validation, and request handling.
//!
//! - [`code_generator`] - Short code generation and alias validation
//! - [`url_validator`] - Destination URL validation
//! - [`client_ip`] - Client IP resolution from peer address and proxy headers

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;
