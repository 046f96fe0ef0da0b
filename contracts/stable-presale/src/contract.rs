#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    Binary, Deps, DepsMut, Env, MessageInfo, OverflowError, OverflowOperation, Reply, Response,
    Timestamp, Uint128,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{self, PURCHASE_REPLY_ID};
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::ownership;
use crate::query;
use crate::registry::resolve_assets;
use crate::state::{
    Config, Ownership, SaleState, WhitelistState, ACCEPTED_ASSETS, CONFIG, OWNERSHIP,
    PARTICIPANT_COUNT, SALE_STATE, WHITELIST_STATE,
};
use stable_presale_common::DEFAULT_ACCOUNTING_DECIMALS;

const CONTRACT_NAME: &str = "crates.io:stable-presale";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Latest second a `Timestamp` can hold without overflowing its nanoseconds.
const MAX_TIMESTAMP_SECONDS: u64 = u64::MAX / 1_000_000_000;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    if !info.funds.is_empty() {
        return Err(ContractError::NonPayable);
    }
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.owner.trim().is_empty() {
        return Err(ContractError::ZeroAddress {
            field: "owner".to_string(),
        });
    }
    if msg.beneficiary.trim().is_empty() {
        return Err(ContractError::ZeroAddress {
            field: "beneficiary".to_string(),
        });
    }
    let owner = deps.api.addr_validate(&msg.owner)?;
    let beneficiary = deps.api.addr_validate(&msg.beneficiary)?;

    if msg.cap.is_zero() {
        return Err(ContractError::ZeroCap);
    }
    if msg.duration == 0 {
        return Err(ContractError::ZeroDuration);
    }

    let end_seconds = msg
        .start_time
        .checked_add(msg.duration)
        .filter(|end| *end <= MAX_TIMESTAMP_SECONDS)
        .ok_or_else(|| OverflowError::new(OverflowOperation::Add))?;
    let start_time = Timestamp::from_seconds(msg.start_time);
    let end_time = Timestamp::from_seconds(end_seconds);
    if end_time <= env.block.time {
        return Err(ContractError::EndBeforeNow {
            end_time,
            now: env.block.time,
        });
    }

    let assets = resolve_assets(deps.as_ref(), &msg.accepted_assets)?;

    let config = Config {
        beneficiary,
        min_per_account: msg.min_per_account,
        max_per_account: msg.max_per_account,
        cap: msg.cap,
        start_time,
        end_time,
        accounting_decimals: msg
            .accounting_decimals
            .unwrap_or(DEFAULT_ACCOUNTING_DECIMALS),
    };
    CONFIG.save(deps.storage, &config)?;
    OWNERSHIP.save(
        deps.storage,
        &Ownership {
            owner: owner.clone(),
            pending_owner: None,
        },
    )?;
    ACCEPTED_ASSETS.save(deps.storage, &assets)?;
    WHITELIST_STATE.save(
        deps.storage,
        &WhitelistState {
            whitelisted_only: true,
            current_round: 1,
        },
    )?;
    SALE_STATE.save(
        deps.storage,
        &SaleState {
            collected: Uint128::zero(),
            ended_by_admin: false,
        },
    )?;
    PARTICIPANT_COUNT.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "stable-presale")
        .add_attribute("owner", owner.to_string())
        .add_attribute("beneficiary", config.beneficiary.to_string())
        .add_attribute("cap", config.cap.to_string())
        .add_attribute("start_time", config.start_time.seconds().to_string())
        .add_attribute("end_time", config.end_time.seconds().to_string())
        .add_attribute("accepted_assets", assets.len().to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    // Nothing in the sale is paid for in native coin
    if !info.funds.is_empty() {
        return Err(ContractError::NonPayable);
    }

    match msg {
        ExecuteMsg::BuyWith { asset, amount } => execute::buy_with(deps, env, info, asset, amount),
        ExecuteMsg::SetWhitelistedOnly { enabled } => {
            execute::set_whitelisted_only(deps, env, info, enabled)
        }
        ExecuteMsg::AdvanceRound { new_round } => {
            execute::advance_round(deps, env, info, new_round)
        }
        ExecuteMsg::AddToWhitelist { addresses } => {
            execute::add_to_whitelist(deps, env, info, addresses)
        }
        ExecuteMsg::RemoveFromWhitelist { addresses } => {
            execute::remove_from_whitelist(deps, env, info, addresses)
        }
        ExecuteMsg::EndPresale {} => execute::end_presale(deps, info),
        ExecuteMsg::WithdrawFunds {} => execute::withdraw_funds(deps, env, info),
        ExecuteMsg::RecoverToken { token } => execute::recover_token(deps, env, info, token),
        ExecuteMsg::RecoverNative { denom } => execute::recover_native(deps, env, info, denom),
        ExecuteMsg::TransferOwnership {
            new_owner,
            force_accept,
        } => ownership::transfer_ownership(deps, info, new_owner, force_accept),
        ExecuteMsg::ClaimOwnership {} => ownership::claim_ownership(deps, info),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        PURCHASE_REPLY_ID => execute::settle_purchase(deps, env, msg.result),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::Status {} => query::query_status(deps, env),
        QueryMsg::Ownership {} => query::query_ownership(deps),
        QueryMsg::AcceptedAssets {} => query::query_accepted_assets(deps),
        QueryMsg::IsAccepted { asset } => query::query_is_accepted(deps, asset),
        QueryMsg::Normalize { asset, amount } => query::query_normalize(deps, asset, amount),
        QueryMsg::IsWhitelisted { address } => query::query_is_whitelisted(deps, address),
        QueryMsg::IsLive {} => query::query_is_live(deps, env),
        QueryMsg::IsEnded {} => query::query_is_ended(deps, env),
        QueryMsg::BalanceOf { address } => query::query_balance_of(deps, address),
        QueryMsg::MaxAllocation { address } => query::query_max_allocation(deps, address),
        QueryMsg::RemainingAllocation { address } => {
            query::query_remaining_allocation(deps, address)
        }
        QueryMsg::ParticipantCount {} => query::query_participant_count(deps),
        QueryMsg::ParticipantAt { index } => query::query_participant_at(deps, index),
        QueryMsg::ParticipantsInRange { from, to } => {
            query::query_participants_in_range(deps, from, to)
        }
    }
}
