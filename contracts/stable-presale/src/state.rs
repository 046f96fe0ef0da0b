use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use stable_presale_common::AcceptedAsset;

pub const CONFIG: Item<Config> = Item::new("config");
pub const OWNERSHIP: Item<Ownership> = Item::new("ownership");
/// Accepted stablecoins in instantiation order. Never modified after instantiate.
pub const ACCEPTED_ASSETS: Item<Vec<AcceptedAsset>> = Item::new("accepted_assets");

pub const WHITELIST_STATE: Item<WhitelistState> = Item::new("whitelist_state");
/// Membership keyed by (round, address). Only the current round is consulted.
pub const WHITELIST: Map<(u64, &Addr), bool> = Map::new("whitelist");

pub const SALE_STATE: Item<SaleState> = Item::new("sale_state");
/// Cumulative normalized contribution per account. Never decreases.
pub const BALANCES: Map<&Addr, Uint128> = Map::new("balances");
/// Participants in first-contribution order.
pub const PARTICIPANTS: Map<u64, Addr> = Map::new("participants");
pub const PARTICIPANT_INDEX: Map<&Addr, u64> = Map::new("participant_index");
pub const PARTICIPANT_COUNT: Item<u64> = Item::new("participant_count");

/// Present only while a `BuyWith` transfer is being settled. Doubles as the
/// reentrancy guard for the purchase path.
pub const PENDING_PURCHASE: Item<PendingPurchase> = Item::new("pending_purchase");

#[cw_serde]
pub struct Config {
    pub beneficiary: Addr,
    /// Per-purchase minimum in accounting units (0 = none)
    pub min_per_account: Uint128,
    /// Per-account ceiling in accounting units (0 = unlimited)
    pub max_per_account: Uint128,
    /// Total accounting units the sale may collect
    pub cap: Uint128,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub accounting_decimals: u8,
}

impl Config {
    /// Ceiling applied to a single account's cumulative balance.
    pub fn effective_max(&self) -> Uint128 {
        if self.max_per_account.is_zero() {
            self.cap
        } else {
            self.max_per_account
        }
    }
}

#[cw_serde]
pub struct Ownership {
    pub owner: Addr,
    pub pending_owner: Option<Addr>,
}

#[cw_serde]
pub struct WhitelistState {
    pub whitelisted_only: bool,
    pub current_round: u64,
}

#[cw_serde]
pub struct SaleState {
    /// Sum of all balances
    pub collected: Uint128,
    pub ended_by_admin: bool,
}

#[cw_serde]
pub struct PendingPurchase {
    pub contributor: Addr,
    pub asset: Addr,
    pub raw_amount: Uint128,
    pub normalized_amount: Uint128,
    /// Contract's asset balance right before the transfer
    pub balance_before: Uint128,
}
