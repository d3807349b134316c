//! Test modules for turul-http-json-rpc-server crate
