use cosmwasm_std::{Addr, Order, StdResult, Storage, Uint128};
use cw_storage_plus::Bound;
use stable_presale_common::ParticipantEntry;

use crate::error::ContractError;
use crate::state::{
    BALANCES, CONFIG, PARTICIPANTS, PARTICIPANT_COUNT, PARTICIPANT_INDEX, SALE_STATE,
};
use crate::whitelist::is_whitelisted;

/// Credit `amount` accounting units to `contributor` and the running total.
/// An account's first nonzero credit appends it to the participant list.
/// Returns the new balance.
pub fn record_contribution(
    storage: &mut dyn Storage,
    contributor: &Addr,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    let previous = balance_of(storage, contributor)?;
    let balance = previous.checked_add(amount)?;
    BALANCES.save(storage, contributor, &balance)?;

    if !PARTICIPANT_INDEX.has(storage, contributor) {
        let index = participant_count(storage)?;
        PARTICIPANTS.save(storage, index, contributor)?;
        PARTICIPANT_INDEX.save(storage, contributor, &index)?;
        PARTICIPANT_COUNT.save(storage, &(index + 1))?;
    }

    let mut sale = SALE_STATE.load(storage)?;
    sale.collected = sale.collected.checked_add(amount)?;
    SALE_STATE.save(storage, &sale)?;

    Ok(balance)
}

pub fn balance_of(storage: &dyn Storage, address: &Addr) -> StdResult<Uint128> {
    Ok(BALANCES.may_load(storage, address)?.unwrap_or_default())
}

/// `max_per_account` for eligible accounts, otherwise zero. A zero result for
/// an eligible account means no per-account ceiling.
pub fn max_allocation_of(storage: &dyn Storage, address: &Addr) -> StdResult<Uint128> {
    if !is_whitelisted(storage, address)? {
        return Ok(Uint128::zero());
    }
    Ok(CONFIG.load(storage)?.max_per_account)
}

pub fn remaining_allocation(storage: &dyn Storage, address: &Addr) -> StdResult<Uint128> {
    if !is_whitelisted(storage, address)? {
        return Ok(Uint128::zero());
    }
    let effective_max = CONFIG.load(storage)?.effective_max();
    Ok(effective_max.saturating_sub(balance_of(storage, address)?))
}

pub fn participant_count(storage: &dyn Storage) -> StdResult<u64> {
    Ok(PARTICIPANT_COUNT.may_load(storage)?.unwrap_or(0))
}

pub fn participant_at(storage: &dyn Storage, index: u64) -> Result<ParticipantEntry, ContractError> {
    let count = participant_count(storage)?;
    if index >= count {
        return Err(ContractError::IndexOutOfRange { index, count });
    }
    let address = PARTICIPANTS.load(storage, index)?;
    let balance = balance_of(storage, &address)?;
    Ok(ParticipantEntry {
        index,
        address,
        balance,
    })
}

/// Widest range `participants_in_range` serves in one query.
pub const MAX_RANGE: u64 = 100;

/// Participants `from..=to` in contribution order, at most `MAX_RANGE` at a
/// time.
pub fn participants_in_range(
    storage: &dyn Storage,
    from: u64,
    to: u64,
) -> Result<Vec<ParticipantEntry>, ContractError> {
    let count = participant_count(storage)?;
    if from > to || to >= count || to - from >= MAX_RANGE {
        return Err(ContractError::InvalidRange { from, to, count });
    }

    PARTICIPANTS
        .range(
            storage,
            Some(Bound::inclusive(from)),
            Some(Bound::inclusive(to)),
            Order::Ascending,
        )
        .map(|item| -> Result<ParticipantEntry, ContractError> {
            let (index, address) = item?;
            let balance = balance_of(storage, &address)?;
            Ok(ParticipantEntry {
                index,
                address,
                balance,
            })
        })
        .collect()
}
