pub mod api;
mod config;
mod error;
pub mod helpers;
mod types;
pub mod version;

pub use config::*;
pub use error::*;
pub use types::*;
