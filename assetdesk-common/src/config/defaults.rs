use std::net::ToSocketAddrs;
use std::time::Duration;

use crate::{ListenEndpoint, Secret};

#[inline]
pub(crate) fn _default_database_url() -> Secret<String> {
    Secret::new("sqlite:data/db".to_owned())
}

#[inline]
pub(crate) fn _default_http_listen() -> ListenEndpoint {
    #[allow(clippy::unwrap_used)]
    ListenEndpoint("0.0.0.0:8888".to_socket_addrs().unwrap().next().unwrap())
}

#[inline]
pub(crate) fn _default_asset_code_prefix() -> String {
    "ORG".to_owned()
}

pub(crate) const fn _default_asset_code_width() -> usize {
    3
}

pub(crate) const fn _default_report_months() -> u32 {
    6
}

#[inline]
pub(crate) fn _default_license_expiry_warning() -> Duration {
    Duration::from_secs(60 * 60 * 24 * 30)
}

#[inline]
pub(crate) fn _default_empty_vec<T>() -> Vec<T> {
    vec![]
}
