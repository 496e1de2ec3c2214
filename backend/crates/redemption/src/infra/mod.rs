//! Infrastructure Layer - store implementations

pub mod kv;
