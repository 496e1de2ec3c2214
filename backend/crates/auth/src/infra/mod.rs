//! Infrastructure Layer
//!
//! Repository implementations over the shared key-value store.

pub mod kv;
