//! Helper functions for formatting and templates

mod date;
mod html;
mod read_time;
mod url;

pub use date::*;
pub use html::*;
pub use read_time::*;
pub use url::*;
