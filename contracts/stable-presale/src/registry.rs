use std::collections::HashSet;

use cosmwasm_std::{Deps, StdResult, Storage, Uint128};
use stable_presale_common::{normalize_amount, AcceptedAsset};

use crate::asset::{AssetTransfer, Cw20Asset};
use crate::error::ContractError;
use crate::state::{ACCEPTED_ASSETS, CONFIG};

/// Validate the configured stablecoin addresses and query each one's decimals.
/// Order is preserved.
pub fn resolve_assets(deps: Deps, addresses: &[String]) -> Result<Vec<AcceptedAsset>, ContractError> {
    let mut seen = HashSet::new();
    let mut assets = Vec::with_capacity(addresses.len());

    for raw in addresses {
        let address = deps.api.addr_validate(raw)?;
        if !seen.insert(address.clone()) {
            return Err(ContractError::DuplicateAsset {
                asset: address.to_string(),
            });
        }
        let decimals = Cw20Asset(address.clone()).decimals(deps.querier)?;
        assets.push(AcceptedAsset { address, decimals });
    }

    Ok(assets)
}

pub fn list_accepted(storage: &dyn Storage) -> StdResult<Vec<AcceptedAsset>> {
    ACCEPTED_ASSETS.load(storage)
}

pub fn find_asset(storage: &dyn Storage, asset: &str) -> StdResult<Option<AcceptedAsset>> {
    Ok(ACCEPTED_ASSETS
        .load(storage)?
        .into_iter()
        .find(|a| a.address.as_str() == asset))
}

pub fn is_accepted(storage: &dyn Storage, asset: &str) -> StdResult<bool> {
    Ok(find_asset(storage, asset)?.is_some())
}

/// Accepted asset or `UnsupportedAsset`.
pub fn require_asset(storage: &dyn Storage, asset: &str) -> Result<AcceptedAsset, ContractError> {
    find_asset(storage, asset)?.ok_or_else(|| ContractError::UnsupportedAsset {
        asset: asset.to_string(),
    })
}

/// Convert `raw` base units of an accepted asset into accounting units.
pub fn normalize(storage: &dyn Storage, asset: &str, raw: Uint128) -> Result<Uint128, ContractError> {
    let accepted = require_asset(storage, asset)?;
    let config = CONFIG.load(storage)?;
    Ok(normalize_amount(
        raw,
        accepted.decimals,
        config.accounting_decimals,
    )?)
}
