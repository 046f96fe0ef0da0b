use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Timestamp, Uint128};
use stable_presale_common::{AcceptedAsset, ParticipantEntry, Phase};

use crate::state::{Config, Ownership};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    /// Receives the collected stablecoins once the sale has ended
    pub beneficiary: String,
    pub min_per_account: Uint128,
    /// 0 disables the per-account ceiling
    pub max_per_account: Uint128,
    pub cap: Uint128,
    /// Unix seconds. Callers resolve "now" themselves.
    pub start_time: u64,
    /// Seconds
    pub duration: u64,
    /// CW20 contract addresses, in display order
    pub accepted_assets: Vec<String>,
    /// Precision of the ledger's accounting unit. Defaults to 6.
    pub accounting_decimals: Option<u8>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Contribute `amount` base units of the CW20 `asset`. The sender must
    /// have approved at least `amount` to this contract beforehand.
    BuyWith { asset: String, amount: Uint128 },
    /// Toggle whitelist enforcement. Owner only.
    SetWhitelistedOnly { enabled: bool },
    /// Move to a later whitelist round. Owner only.
    AdvanceRound { new_round: u64 },
    /// Whitelist addresses for the current round. Owner only.
    AddToWhitelist { addresses: Vec<String> },
    /// Drop addresses from the current round. Owner only.
    RemoveFromWhitelist { addresses: Vec<String> },
    /// Close a sold-out sale before its end time. Owner only.
    EndPresale {},
    /// Send every accepted stablecoin balance to the beneficiary.
    WithdrawFunds {},
    /// Sweep any CW20 balance to the owner after the sale.
    RecoverToken { token: String },
    /// Sweep a native denom balance to the owner after the sale.
    RecoverNative { denom: String },
    TransferOwnership {
        new_owner: String,
        /// Skip the claim step
        force_accept: bool,
    },
    ClaimOwnership {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(StatusResponse)]
    Status {},
    #[returns(Ownership)]
    Ownership {},
    #[returns(Vec<AcceptedAsset>)]
    AcceptedAssets {},
    #[returns(bool)]
    IsAccepted { asset: String },
    #[returns(Uint128)]
    Normalize { asset: String, amount: Uint128 },
    #[returns(bool)]
    IsWhitelisted { address: String },
    #[returns(bool)]
    IsLive {},
    #[returns(bool)]
    IsEnded {},
    #[returns(Uint128)]
    BalanceOf { address: String },
    #[returns(Uint128)]
    MaxAllocation { address: String },
    #[returns(Uint128)]
    RemainingAllocation { address: String },
    #[returns(u64)]
    ParticipantCount {},
    #[returns(ParticipantEntry)]
    ParticipantAt { index: u64 },
    /// Inclusive on both ends, at most 100 entries per query.
    #[returns(Vec<ParticipantEntry>)]
    ParticipantsInRange { from: u64, to: u64 },
}

#[cw_serde]
pub struct StatusResponse {
    pub phase: Phase,
    pub collected: Uint128,
    pub cap: Uint128,
    pub ended_by_admin: bool,
    pub whitelisted_only: bool,
    pub current_round: u64,
    pub participant_count: u64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

