//! Redemption Engine Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Beneficiary entity, token codec, redemption rules, repository trait
//! - `application/` - Issue, redeem and inspect use cases, public URL resolver
//! - `infra/` - Key-value store implementation of the repository
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Security Model
//! - Tokens carry a truncated HMAC-SHA256 tag under a server secret and are
//!   compared in constant time; nothing about a token is trusted before that
//! - A token is only valid for the issuance it was minted for (`issued_at`
//!   must match the stored record)
//! - Every state change is a single store-side compare-and-set, so any number
//!   of backend processes can serve scans of the same code concurrently
//! - Store failures surface as retryable errors, never as redemption outcomes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::RedemptionConfig;
pub use domain::entities::Beneficiary;
pub use domain::token::{DecodedToken, TokenCodec};
pub use domain::value_objects::{BeneficiaryStatus, Outcome};
pub use error::{RedemptionError, RedemptionResult};
pub use infra::kv::KvBeneficiaryRepository;
pub use presentation::handlers::RedemptionAppState;
pub use presentation::router::{redemption_router, redemption_router_generic};
