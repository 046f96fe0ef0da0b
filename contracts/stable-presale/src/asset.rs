//! Fungible-asset collaborator seam.
//!
//! The sale never talks to a token contract directly; it goes through
//! [`AssetTransfer`] so the purchase and sweep paths only depend on the four
//! capabilities they need. [`Cw20Asset`] is the on-chain implementation.

use cosmwasm_std::{to_json_binary, Addr, CosmosMsg, QuerierWrapper, StdResult, Uint128, WasmMsg};
use cw20::{AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, TokenInfoResponse};

pub trait AssetTransfer {
    fn address(&self) -> &Addr;

    fn decimals(&self, querier: QuerierWrapper) -> StdResult<u8>;

    fn balance_of(&self, querier: QuerierWrapper, holder: &Addr) -> StdResult<Uint128>;

    fn allowance(&self, querier: QuerierWrapper, owner: &Addr, spender: &Addr)
        -> StdResult<Uint128>;

    /// Pull `amount` from `owner` into `recipient` using the caller's allowance.
    fn transfer_from_msg(&self, owner: &Addr, recipient: &Addr, amount: Uint128)
        -> StdResult<CosmosMsg>;

    /// Send `amount` held by the calling contract to `recipient`.
    fn transfer_msg(&self, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg>;
}

/// A CW20 token contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cw20Asset(pub Addr);

impl AssetTransfer for Cw20Asset {
    fn address(&self) -> &Addr {
        &self.0
    }

    fn decimals(&self, querier: QuerierWrapper) -> StdResult<u8> {
        let info: TokenInfoResponse =
            querier.query_wasm_smart(self.0.to_string(), &Cw20QueryMsg::TokenInfo {})?;
        Ok(info.decimals)
    }

    fn balance_of(&self, querier: QuerierWrapper, holder: &Addr) -> StdResult<Uint128> {
        let res: BalanceResponse = querier.query_wasm_smart(
            self.0.to_string(),
            &Cw20QueryMsg::Balance {
                address: holder.to_string(),
            },
        )?;
        Ok(res.balance)
    }

    fn allowance(
        &self,
        querier: QuerierWrapper,
        owner: &Addr,
        spender: &Addr,
    ) -> StdResult<Uint128> {
        let res: AllowanceResponse = querier.query_wasm_smart(
            self.0.to_string(),
            &Cw20QueryMsg::Allowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
            },
        )?;
        Ok(res.allowance)
    }

    fn transfer_from_msg(
        &self,
        owner: &Addr,
        recipient: &Addr,
        amount: Uint128,
    ) -> StdResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.0.to_string(),
            msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
                owner: owner.to_string(),
                recipient: recipient.to_string(),
                amount,
            })?,
            funds: vec![],
        }
        .into())
    }

    fn transfer_msg(&self, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: self.0.to_string(),
            msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                recipient: recipient.to_string(),
                amount,
            })?,
            funds: vec![],
        }
        .into())
    }
}
