#![allow(non_snake_case)]

pub mod Asset;
pub mod AssetHistory;
pub mod Category;
pub mod License;
pub mod LicenseAsset;
pub mod Location;
pub mod Staff;
pub mod StaffHistory;

mod change_type;
pub use change_type::ChangeType;
