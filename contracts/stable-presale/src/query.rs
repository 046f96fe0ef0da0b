use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Uint128};

use crate::clock::{current_phase, derive_phase};
use crate::error::ContractError;
use crate::ledger;
use crate::msg::StatusResponse;
use crate::registry;
use crate::state::{CONFIG, OWNERSHIP, SALE_STATE, WHITELIST_STATE};
use crate::whitelist;

type QueryResult = Result<Binary, ContractError>;

pub fn query_config(deps: Deps) -> QueryResult {
    let config = CONFIG.load(deps.storage)?;
    Ok(to_json_binary(&config)?)
}

pub fn query_status(deps: Deps, env: Env) -> QueryResult {
    let config = CONFIG.load(deps.storage)?;
    let sale = SALE_STATE.load(deps.storage)?;
    let wl = WHITELIST_STATE.load(deps.storage)?;

    Ok(to_json_binary(&StatusResponse {
        phase: derive_phase(env.block.time, &config, sale.ended_by_admin),
        collected: sale.collected,
        cap: config.cap,
        ended_by_admin: sale.ended_by_admin,
        whitelisted_only: wl.whitelisted_only,
        current_round: wl.current_round,
        participant_count: ledger::participant_count(deps.storage)?,
        start_time: config.start_time,
        end_time: config.end_time,
    })?)
}

pub fn query_ownership(deps: Deps) -> QueryResult {
    let ownership = OWNERSHIP.load(deps.storage)?;
    Ok(to_json_binary(&ownership)?)
}

pub fn query_accepted_assets(deps: Deps) -> QueryResult {
    Ok(to_json_binary(&registry::list_accepted(deps.storage)?)?)
}

pub fn query_is_accepted(deps: Deps, asset: String) -> QueryResult {
    Ok(to_json_binary(&registry::is_accepted(deps.storage, &asset)?)?)
}

pub fn query_normalize(deps: Deps, asset: String, amount: Uint128) -> QueryResult {
    let normalized = registry::normalize(deps.storage, &asset, amount)?;
    Ok(to_json_binary(&normalized)?)
}

pub fn query_is_whitelisted(deps: Deps, address: String) -> QueryResult {
    let addr = deps.api.addr_validate(&address)?;
    Ok(to_json_binary(&whitelist::is_whitelisted(deps.storage, &addr)?)?)
}

pub fn query_is_live(deps: Deps, env: Env) -> QueryResult {
    Ok(to_json_binary(&current_phase(deps.storage, &env)?.is_live())?)
}

pub fn query_is_ended(deps: Deps, env: Env) -> QueryResult {
    Ok(to_json_binary(&current_phase(deps.storage, &env)?.is_ended())?)
}

pub fn query_balance_of(deps: Deps, address: String) -> QueryResult {
    let addr = deps.api.addr_validate(&address)?;
    Ok(to_json_binary(&ledger::balance_of(deps.storage, &addr)?)?)
}

pub fn query_max_allocation(deps: Deps, address: String) -> QueryResult {
    let addr = deps.api.addr_validate(&address)?;
    Ok(to_json_binary(&ledger::max_allocation_of(deps.storage, &addr)?)?)
}

pub fn query_remaining_allocation(deps: Deps, address: String) -> QueryResult {
    let addr = deps.api.addr_validate(&address)?;
    Ok(to_json_binary(&ledger::remaining_allocation(
        deps.storage,
        &addr,
    )?)?)
}

pub fn query_participant_count(deps: Deps) -> QueryResult {
    Ok(to_json_binary(&ledger::participant_count(deps.storage)?)?)
}

pub fn query_participant_at(deps: Deps, index: u64) -> QueryResult {
    let entry = ledger::participant_at(deps.storage, index)?;
    Ok(to_json_binary(&entry)?)
}

pub fn query_participants_in_range(deps: Deps, from: u64, to: u64) -> QueryResult {
    let entries = ledger::participants_in_range(deps.storage, from, to)?;
    Ok(to_json_binary(&entries)?)
}
