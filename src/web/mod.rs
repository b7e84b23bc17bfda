pub mod data;
mod error;
mod log;
pub mod midware;
pub mod routes;

pub use error::{Error, ErrorBody, ErrorCategory, Result};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
