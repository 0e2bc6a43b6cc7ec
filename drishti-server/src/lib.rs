//! drishti-server: HTTP surface for the drishti detection service

pub mod files;
pub mod http;
