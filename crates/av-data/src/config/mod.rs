//! Dashboard and loading configuration

pub mod dashboard_config;
pub mod null_handling;

pub use dashboard_config::*;
pub use null_handling::*;
