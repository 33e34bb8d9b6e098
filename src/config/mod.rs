//! Configuration module

mod api;
mod site;

pub use api::{ApiConfig, ConfigError};
pub use site::{Fallback, ReadTimeConfig, ReadTimeMode, SiteConfig};
