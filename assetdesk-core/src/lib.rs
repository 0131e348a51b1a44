pub mod asset_codes;
pub mod assets;
pub mod categories;
pub mod consts;
pub mod db;
pub mod history;
pub mod licenses;
pub mod reports;
mod services;
pub use services::*;
pub mod staff;

#[cfg(test)]
pub(crate) mod test_helpers;
