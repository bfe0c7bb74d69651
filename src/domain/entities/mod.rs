//! Core domain entities.
//!
//! Entities are plain data structures. Creation inputs are modelled as
//! separate `New*` structs so the store can assign identifiers and timestamps.
//!
//! - [`ShortUrl`] - a short code mapped to an original URL
//! - [`Click`] - a recorded redirect

pub mod click;
pub mod short_url;

pub use click::{Click, ClickStats, NewClick};
pub use short_url::{NewShortUrl, ShortUrl};
