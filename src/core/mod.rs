//! Shared infrastructure used by the upstream client.

pub mod http_client;
