//! HTTP inbound adapter exposing the route surface.

pub mod auth;
pub mod error;
pub mod landing;
pub mod records;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::{ApiResult, LOGIN_PATH};
