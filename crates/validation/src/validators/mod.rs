//! Built-in validators

pub mod length;
pub mod license;
pub mod required;
