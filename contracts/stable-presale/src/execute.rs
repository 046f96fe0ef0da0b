use cosmwasm_std::{
    Addr, BankMsg, CosmosMsg, Deps, DepsMut, Env, Event, MessageInfo, Response, SubMsg,
    SubMsgResult, Uint128,
};
use stable_presale_common::normalize_amount;

use crate::asset::{AssetTransfer, Cw20Asset};
use crate::clock::{ensure_ended, ensure_live, ensure_not_ended};
use crate::error::ContractError;
use crate::ledger;
use crate::ownership::ensure_owner;
use crate::registry::{list_accepted, require_asset};
use crate::state::{PendingPurchase, CONFIG, PENDING_PURCHASE, SALE_STATE};
use crate::whitelist;

/// Reply id for the CW20 `TransferFrom` issued by `buy_with`.
pub const PURCHASE_REPLY_ID: u64 = 1;

/// Validate a contribution and pull the stablecoins from the sender.
///
/// Checks run in a fixed order and the first failure is reported. The ledger
/// is only credited in the transfer reply, after the contract's balance delta
/// confirms the tokens actually arrived.
pub fn buy_with(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    asset: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    if PENDING_PURCHASE.exists(deps.storage) {
        return Err(ContractError::PurchaseInFlight);
    }

    ensure_live(deps.storage, &env)?;

    if !whitelist::is_whitelisted(deps.storage, &info.sender)? {
        return Err(ContractError::NotWhitelisted {
            address: info.sender.to_string(),
        });
    }

    // A zero raw amount is zero in any precision, no asset lookup needed
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    let accepted = require_asset(deps.storage, &asset)?;
    let config = CONFIG.load(deps.storage)?;
    let normalized = normalize_amount(amount, accepted.decimals, config.accounting_decimals)?;
    if normalized.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    // Per purchase, not per cumulative balance
    if !config.min_per_account.is_zero() && normalized < config.min_per_account {
        return Err(ContractError::AmountTooLow {
            amount: normalized,
            min: config.min_per_account,
        });
    }

    let new_balance = ledger::balance_of(deps.storage, &info.sender)?.checked_add(normalized)?;
    let effective_max = config.effective_max();
    if new_balance > effective_max {
        return Err(ContractError::AmountTooHigh {
            balance: new_balance,
            max: effective_max,
        });
    }

    let sale = SALE_STATE.load(deps.storage)?;
    let remaining = config.cap.saturating_sub(sale.collected);
    if normalized > remaining {
        return Err(ContractError::InsufficientRemainingCap {
            amount: normalized,
            remaining,
        });
    }

    let token = Cw20Asset(accepted.address);
    let (transfer, balance_before) =
        prepare_pull(deps.as_ref(), &env, &info.sender, &token, amount)?;

    PENDING_PURCHASE.save(
        deps.storage,
        &PendingPurchase {
            contributor: info.sender.clone(),
            asset: token.address().clone(),
            raw_amount: amount,
            normalized_amount: normalized,
            balance_before,
        },
    )?;

    Ok(Response::new()
        .add_submessage(SubMsg::reply_always(transfer, PURCHASE_REPLY_ID))
        .add_attribute("action", "buy_with")
        .add_attribute("contributor", info.sender.to_string())
        .add_attribute("asset", token.address().to_string())
        .add_attribute("raw_amount", amount.to_string())
        .add_attribute("amount", normalized.to_string()))
}

/// Allowance check plus the transfer message. Also snapshots the contract's
/// balance so the reply can measure what actually arrived.
fn prepare_pull<A: AssetTransfer>(
    deps: Deps,
    env: &Env,
    payer: &Addr,
    asset: &A,
    amount: Uint128,
) -> Result<(CosmosMsg, Uint128), ContractError> {
    let allowance = asset.allowance(deps.querier, payer, &env.contract.address)?;
    if allowance < amount {
        return Err(ContractError::InsufficientAllowance {
            allowance,
            required: amount,
        });
    }

    let balance_before = asset.balance_of(deps.querier, &env.contract.address)?;
    let msg = asset.transfer_from_msg(payer, &env.contract.address, amount)?;
    Ok((msg, balance_before))
}

/// Second half of `buy_with`, run from the transfer reply whatever its
/// outcome. A rejected transfer and a short balance delta both surface as
/// `TransferFailed` and revert the purchase.
pub fn settle_purchase(
    deps: DepsMut,
    env: Env,
    result: SubMsgResult,
) -> Result<Response, ContractError> {
    let pending = PENDING_PURCHASE.load(deps.storage)?;
    PENDING_PURCHASE.remove(deps.storage);

    if let SubMsgResult::Err(reason) = result {
        return Err(ContractError::TransferFailed {
            asset: pending.asset.to_string(),
            expected: pending.raw_amount,
            received: Uint128::zero(),
            reason,
        });
    }

    let token = Cw20Asset(pending.asset.clone());
    let balance_after = token.balance_of(deps.querier, &env.contract.address)?;
    let received = balance_after.saturating_sub(pending.balance_before);
    if received < pending.raw_amount {
        return Err(ContractError::TransferFailed {
            asset: pending.asset.to_string(),
            expected: pending.raw_amount,
            received,
            reason: "balance delta below transferred amount".to_string(),
        });
    }

    let balance =
        ledger::record_contribution(deps.storage, &pending.contributor, pending.normalized_amount)?;
    let collected = SALE_STATE.load(deps.storage)?.collected;

    Ok(Response::new()
        .add_attribute("action", "purchase_settled")
        .add_attribute("contributor", pending.contributor.to_string())
        .add_attribute("amount", pending.normalized_amount.to_string())
        .add_event(
            Event::new("presale_purchased")
                .add_attribute("contributor", pending.contributor.to_string())
                .add_attribute("amount", pending.normalized_amount.to_string())
                .add_attribute("asset", pending.asset.to_string())
                .add_attribute("raw_amount", pending.raw_amount.to_string())
                .add_attribute("balance", balance.to_string())
                .add_attribute("collected", collected.to_string()),
        ))
}

pub fn set_whitelisted_only(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    enabled: bool,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    ensure_not_ended(deps.storage, &env)?;

    whitelist::set_whitelisted_only(deps.storage, enabled)?;

    Ok(Response::new()
        .add_attribute("action", "set_whitelisted_only")
        .add_attribute("enabled", enabled.to_string())
        .add_event(
            Event::new("presale_whitelist_changed").add_attribute("enabled", enabled.to_string()),
        ))
}

pub fn advance_round(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    new_round: u64,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    ensure_not_ended(deps.storage, &env)?;

    let previous = whitelist::advance_round(deps.storage, new_round)?;

    Ok(Response::new()
        .add_attribute("action", "advance_round")
        .add_attribute("previous_round", previous.to_string())
        .add_attribute("round", new_round.to_string())
        .add_event(
            Event::new("presale_whitelist_round_changed")
                .add_attribute("round", new_round.to_string()),
        ))
}

fn whitelist_updated_event(operation: &str, round: u64, count: usize) -> Event {
    Event::new("presale_whitelist_updated")
        .add_attribute("operation", operation)
        .add_attribute("round", round.to_string())
        .add_attribute("count", count.to_string())
}

pub fn add_to_whitelist(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    addresses: Vec<String>,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    ensure_not_ended(deps.storage, &env)?;

    let validated = addresses
        .iter()
        .map(|a| deps.api.addr_validate(a))
        .collect::<Result<Vec<_>, _>>()?;
    let round = whitelist::add_addresses(deps.storage, &validated)?;

    Ok(Response::new()
        .add_attribute("action", "add_to_whitelist")
        .add_attribute("round", round.to_string())
        .add_attribute("count", validated.len().to_string())
        .add_event(whitelist_updated_event("add", round, validated.len())))
}

pub fn remove_from_whitelist(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    addresses: Vec<String>,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    ensure_not_ended(deps.storage, &env)?;

    let validated = addresses
        .iter()
        .map(|a| deps.api.addr_validate(a))
        .collect::<Result<Vec<_>, _>>()?;
    let round = whitelist::remove_addresses(deps.storage, &validated)?;

    Ok(Response::new()
        .add_attribute("action", "remove_from_whitelist")
        .add_attribute("round", round.to_string())
        .add_attribute("count", validated.len().to_string())
        .add_event(whitelist_updated_event("remove", round, validated.len())))
}

/// Close a sold-out sale ahead of its end time. Irrevocable.
pub fn end_presale(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;

    let config = CONFIG.load(deps.storage)?;
    let mut sale = SALE_STATE.load(deps.storage)?;

    if sale.ended_by_admin {
        return Err(ContractError::AlreadyFinalized);
    }
    if sale.collected < config.cap {
        return Err(ContractError::CapNotReached {
            collected: sale.collected,
            cap: config.cap,
        });
    }

    sale.ended_by_admin = true;
    SALE_STATE.save(deps.storage, &sale)?;

    Ok(Response::new()
        .add_attribute("action", "end_presale")
        .add_event(
            Event::new("presale_finalized")
                .add_attribute("collected", sale.collected.to_string())
                .add_attribute("closed_by", info.sender.to_string()),
        ))
}

/// Send the contract's full balance of every accepted stablecoin to the
/// beneficiary, including anything that arrived outside `BuyWith`.
pub fn withdraw_funds(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.beneficiary {
        return Err(ContractError::NotBeneficiary);
    }
    ensure_ended(deps.storage, &env)?;

    let mut response = Response::new()
        .add_attribute("action", "withdraw_funds")
        .add_attribute("beneficiary", config.beneficiary.to_string());
    let mut event = Event::new("presale_funds_withdrawn")
        .add_attribute("beneficiary", config.beneficiary.to_string());

    for accepted in list_accepted(deps.storage)? {
        let token = Cw20Asset(accepted.address);
        let balance = token.balance_of(deps.querier, &env.contract.address)?;
        if balance.is_zero() {
            continue;
        }
        response = response.add_message(token.transfer_msg(&config.beneficiary, balance)?);
        event = event.add_attribute(token.address().to_string(), balance.to_string());
    }

    Ok(response.add_event(event))
}

/// Sweep any CW20 balance, accepted or not, to the owner.
pub fn recover_token(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
) -> Result<Response, ContractError> {
    let ownership = ensure_owner(deps.storage, &info.sender)?;
    ensure_ended(deps.storage, &env)?;

    let token = Cw20Asset(deps.api.addr_validate(&token)?);
    let balance = token.balance_of(deps.querier, &env.contract.address)?;

    let mut response = Response::new()
        .add_attribute("action", "recover_token")
        .add_attribute("token", token.address().to_string())
        .add_attribute("amount", balance.to_string());
    if !balance.is_zero() {
        response = response
            .add_message(token.transfer_msg(&ownership.owner, balance)?)
            .add_event(
                Event::new("presale_token_recovered")
                    .add_attribute("token", token.address().to_string())
                    .add_attribute("amount", balance.to_string())
                    .add_attribute("recipient", ownership.owner.to_string()),
            );
    }

    Ok(response)
}

/// Sweep the contract's bank balance of `denom` to the owner.
pub fn recover_native(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    denom: String,
) -> Result<Response, ContractError> {
    let ownership = ensure_owner(deps.storage, &info.sender)?;
    ensure_ended(deps.storage, &env)?;

    let balance = deps
        .querier
        .query_balance(&env.contract.address, denom.clone())?;

    let mut response = Response::new()
        .add_attribute("action", "recover_native")
        .add_attribute("denom", denom.clone())
        .add_attribute("amount", balance.amount.to_string());
    if !balance.amount.is_zero() {
        response = response
            .add_message(BankMsg::Send {
                to_address: ownership.owner.to_string(),
                amount: vec![balance.clone()],
            })
            .add_event(
                Event::new("presale_native_recovered")
                    .add_attribute("denom", denom)
                    .add_attribute("amount", balance.amount.to_string())
                    .add_attribute("recipient", ownership.owner.to_string()),
            );
    }

    Ok(response)
}
