pub mod decimals;
pub mod types;

pub use decimals::{normalize_amount, DEFAULT_ACCOUNTING_DECIMALS};
pub use types::{AcceptedAsset, ParticipantEntry, Phase};
