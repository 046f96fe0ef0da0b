use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};

/// Lifecycle phase of the sale, derived from block time and the admin end flag.
#[cw_serde]
pub enum Phase {
    NotStarted,
    Live,
    Ended,
}

impl Phase {
    pub fn is_live(&self) -> bool {
        matches!(self, Phase::Live)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, Phase::Ended)
    }
}

/// A CW20 stablecoin accepted as payment, with its native precision.
#[cw_serde]
pub struct AcceptedAsset {
    pub address: Addr,
    pub decimals: u8,
}

/// One contributor in participation order.
#[cw_serde]
pub struct ParticipantEntry {
    pub index: u64,
    pub address: Addr,
    /// Cumulative normalized contribution
    pub balance: Uint128,
}
