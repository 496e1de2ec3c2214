//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Beneficiary)
//! - Domain value objects (BeneficiaryStatus, Outcome)
//! - The redemption token codec
//! - Domain services (redemption state rules)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod token;
pub mod value_objects;
