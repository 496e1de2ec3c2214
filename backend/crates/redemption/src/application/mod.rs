//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod config;
pub mod inspect;
pub mod issue;
pub mod public_url;
pub mod redeem;

pub use inspect::{InspectOutput, InspectUseCase};
pub use issue::{IssueInput, IssueOutput, IssueUseCase};
pub use redeem::{RedeemInput, RedeemOutput, RedeemUseCase};
