//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the NetSignal core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! The monitor crate (`core-netsignal`) builds on these pieces: it is started
//! from a validated [`NetSignalConfig`](config::NetSignalConfig), logs through
//! `tracing`, and mirrors every stabilized transition onto the
//! [`EventBus`](events::EventBus).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
