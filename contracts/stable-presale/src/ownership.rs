use cosmwasm_std::{Addr, DepsMut, Event, MessageInfo, Response, Storage};

use crate::error::ContractError;
use crate::state::{Ownership, OWNERSHIP};

pub fn ensure_owner(storage: &dyn Storage, sender: &Addr) -> Result<Ownership, ContractError> {
    let ownership = OWNERSHIP.load(storage)?;
    if *sender != ownership.owner {
        return Err(ContractError::NotOwner);
    }
    Ok(ownership)
}

fn ownership_transferred_event(previous: &Addr, new_owner: &Addr) -> Event {
    Event::new("presale_ownership_transferred")
        .add_attribute("previous_owner", previous.to_string())
        .add_attribute("new_owner", new_owner.to_string())
}

/// Hand ownership to `new_owner`. Without `force_accept` the candidate has to
/// call `ClaimOwnership` before anything changes hands.
pub fn transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
    force_accept: bool,
) -> Result<Response, ContractError> {
    let mut ownership = ensure_owner(deps.storage, &info.sender)?;

    if new_owner.trim().is_empty() {
        return Err(ContractError::ZeroAddress {
            field: "new_owner".to_string(),
        });
    }
    let candidate = deps.api.addr_validate(&new_owner)?;

    let response = Response::new()
        .add_attribute("action", "transfer_ownership")
        .add_attribute("candidate", candidate.to_string())
        .add_attribute("force_accept", force_accept.to_string());

    if force_accept {
        let previous = std::mem::replace(&mut ownership.owner, candidate.clone());
        ownership.pending_owner = None;
        OWNERSHIP.save(deps.storage, &ownership)?;
        return Ok(response.add_event(ownership_transferred_event(&previous, &candidate)));
    }

    ownership.pending_owner = Some(candidate);
    OWNERSHIP.save(deps.storage, &ownership)?;
    Ok(response)
}

pub fn claim_ownership(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut ownership = OWNERSHIP.load(deps.storage)?;

    if ownership.pending_owner.as_ref() != Some(&info.sender) {
        return Err(ContractError::NotPendingOwner);
    }

    let previous = std::mem::replace(&mut ownership.owner, info.sender.clone());
    ownership.pending_owner = None;
    OWNERSHIP.save(deps.storage, &ownership)?;

    Ok(Response::new()
        .add_attribute("action", "claim_ownership")
        .add_attribute("owner", info.sender.to_string())
        .add_event(ownership_transferred_event(&previous, &info.sender)))
}
