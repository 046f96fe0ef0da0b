use cosmwasm_std::{OverflowError, StdError, Timestamp, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    // ── Configuration ──
    #[error("{field} must not be the zero address")]
    ZeroAddress { field: String },

    #[error("cap must be greater than zero")]
    ZeroCap,

    #[error("duration must be greater than zero")]
    ZeroDuration,

    #[error("sale end {end_time} is not after current time {now}")]
    EndBeforeNow { end_time: Timestamp, now: Timestamp },

    #[error("asset {asset} listed more than once")]
    DuplicateAsset { asset: String },

    // ── Authorization ──
    #[error("caller is not the owner")]
    NotOwner,

    #[error("caller is not the beneficiary")]
    NotBeneficiary,

    #[error("caller is not the pending owner")]
    NotPendingOwner,

    // ── Lifecycle ──
    #[error("sale is not active")]
    SaleNotActive,

    #[error("sale has not ended")]
    NotEnded,

    #[error("sale has ended, whitelist is frozen")]
    SaleEnded,

    #[error("cap not reached: collected {collected} of {cap}")]
    CapNotReached { collected: Uint128, cap: Uint128 },

    #[error("sale already finalized by the owner")]
    AlreadyFinalized,

    #[error("new round {requested} must be greater than current round {current}")]
    InvalidRound { current: u64, requested: u64 },

    // ── Admissibility ──
    #[error("{address} is not whitelisted for the current round")]
    NotWhitelisted { address: String },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("unsupported asset {asset}")]
    UnsupportedAsset { asset: String },

    #[error("amount {amount} is below the per-purchase minimum {min}")]
    AmountTooLow { amount: Uint128, min: Uint128 },

    #[error("balance would reach {balance}, above account maximum {max}")]
    AmountTooHigh { balance: Uint128, max: Uint128 },

    #[error("amount {amount} exceeds remaining cap {remaining}")]
    InsufficientRemainingCap { amount: Uint128, remaining: Uint128 },

    #[error("allowance {allowance} is below required {required}")]
    InsufficientAllowance { allowance: Uint128, required: Uint128 },

    #[error("no native funds accepted")]
    NonPayable,

    #[error("a purchase is already being settled")]
    PurchaseInFlight,

    // ── External transfer ──
    #[error("transfer of {asset} failed: expected {expected}, received {received} ({reason})")]
    TransferFailed {
        asset: String,
        expected: Uint128,
        received: Uint128,
        reason: String,
    },

    #[error("unknown reply id {id}")]
    UnknownReplyId { id: u64 },

    // ── Enumeration ──
    #[error("participant index {index} out of range (count {count})")]
    IndexOutOfRange { index: u64, count: u64 },

    #[error("invalid participant range [{from}, {to}] (count {count})")]
    InvalidRange { from: u64, to: u64, count: u64 },
}
