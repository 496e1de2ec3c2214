//! Shared Kernel
//!
//! Vocabulary every crate in the redemption service agrees on:
//! - the unified [`error::app_error::AppError`] and its HTTP mapping
//! - typed identifiers for accounts and beneficiaries
//!
//! Only things whose meaning is stable across all domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
