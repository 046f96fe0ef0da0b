pub mod asset;
pub mod clock;
pub mod contract;
pub mod error;
pub mod execute;
pub mod ledger;
pub mod msg;
pub mod ownership;
pub mod query;
pub mod registry;
pub mod state;
pub mod whitelist;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::error::ContractError;
