//! Request handlers, one module per resource.

pub mod cars;
pub mod drivers;
pub mod home;
pub mod manufacturers;
