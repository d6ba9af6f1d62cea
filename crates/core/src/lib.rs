//! # fleet-core
//!
//! Domain layer for the fleet management service: the Manufacturer, Driver
//! and Car models, the substring search term used by every listing endpoint,
//! and environment-driven application configuration.

pub mod config;
pub mod model;
pub mod search;

pub use config::{AppConfig, ConfigError, Environment, LoggingConfig, ServerConfig};
pub use model::{Car, Driver, Manufacturer};
pub use search::SearchTerm;
