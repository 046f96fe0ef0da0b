use cosmwasm_std::{Addr, StdResult, Storage};

use crate::error::ContractError;
use crate::state::{WHITELIST, WHITELIST_STATE};

/// Eligibility for the current round. Memberships from earlier rounds are
/// ignored.
pub fn is_whitelisted(storage: &dyn Storage, address: &Addr) -> StdResult<bool> {
    let state = WHITELIST_STATE.load(storage)?;
    if !state.whitelisted_only {
        return Ok(true);
    }
    Ok(WHITELIST
        .may_load(storage, (state.current_round, address))?
        .unwrap_or(false))
}

pub fn set_whitelisted_only(storage: &mut dyn Storage, enabled: bool) -> StdResult<()> {
    WHITELIST_STATE.update(storage, |mut state| -> StdResult<_> {
        state.whitelisted_only = enabled;
        Ok(state)
    })?;
    Ok(())
}

/// Returns the round that was replaced.
pub fn advance_round(storage: &mut dyn Storage, new_round: u64) -> Result<u64, ContractError> {
    let mut state = WHITELIST_STATE.load(storage)?;
    if new_round <= state.current_round {
        return Err(ContractError::InvalidRound {
            current: state.current_round,
            requested: new_round,
        });
    }
    let previous = state.current_round;
    state.current_round = new_round;
    WHITELIST_STATE.save(storage, &state)?;
    Ok(previous)
}

pub fn add_addresses(storage: &mut dyn Storage, addresses: &[Addr]) -> StdResult<u64> {
    let round = WHITELIST_STATE.load(storage)?.current_round;
    for address in addresses {
        WHITELIST.save(storage, (round, address), &true)?;
    }
    Ok(round)
}

pub fn remove_addresses(storage: &mut dyn Storage, addresses: &[Addr]) -> StdResult<u64> {
    let round = WHITELIST_STATE.load(storage)?.current_round;
    for address in addresses {
        WHITELIST.remove(storage, (round, address));
    }
    Ok(round)
}
