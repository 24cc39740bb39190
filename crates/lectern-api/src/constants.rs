//! API version and path prefix

pub const API_VERSION: &str = "v1";

pub const API_PREFIX: &str = "/api/v1";
