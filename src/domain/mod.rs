//! Domain layer containing business entities and contracts.
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits define contracts implemented by
//! `crate::infrastructure`.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click event model
//! - [`click_worker`] - Asynchronous click persistence
//!
//! # Click Processing Flow
//!
//! 1. A successful resolution emits a [`click_event::ClickEvent`] on a bounded channel
//! 2. [`click_worker::run_click_worker`] persists events with retry
//! 3. Click rows are written via [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
