use cosmwasm_std::{Env, StdResult, Storage, Timestamp};
use stable_presale_common::Phase;

use crate::error::ContractError;
use crate::state::{Config, CONFIG, SALE_STATE};

/// `Ended` is absorbing: once end time passes or the owner closes a sold-out
/// sale, nothing moves the phase back.
pub fn derive_phase(now: Timestamp, config: &Config, ended_by_admin: bool) -> Phase {
    if ended_by_admin || now >= config.end_time {
        Phase::Ended
    } else if now < config.start_time {
        Phase::NotStarted
    } else {
        Phase::Live
    }
}

pub fn current_phase(storage: &dyn Storage, env: &Env) -> StdResult<Phase> {
    let config = CONFIG.load(storage)?;
    let sale = SALE_STATE.load(storage)?;
    Ok(derive_phase(env.block.time, &config, sale.ended_by_admin))
}

pub fn ensure_live(storage: &dyn Storage, env: &Env) -> Result<(), ContractError> {
    if !current_phase(storage, env)?.is_live() {
        return Err(ContractError::SaleNotActive);
    }
    Ok(())
}

pub fn ensure_ended(storage: &dyn Storage, env: &Env) -> Result<(), ContractError> {
    if !current_phase(storage, env)?.is_ended() {
        return Err(ContractError::NotEnded);
    }
    Ok(())
}

pub fn ensure_not_ended(storage: &dyn Storage, env: &Env) -> Result<(), ContractError> {
    if current_phase(storage, env)?.is_ended() {
        return Err(ContractError::SaleEnded);
    }
    Ok(())
}
