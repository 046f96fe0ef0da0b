//! In-memory CW20 token book for exercising the sale against the mock
//! querier.
//!
//! The book answers `TokenInfo`, `Balance` and `Allowance` queries and applies
//! the `TransferFrom`/`Transfer` messages the contract emits, so tests can run
//! a purchase end to end: execute, settle the submessage, call `reply`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cosmwasm_std::testing::{MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, CosmosMsg, Env, MessageInfo, Order, OwnedDeps,
    QuerierResult, Record, Reply, ReplyOn, Response, StdError, Storage, SubMsgResponse,
    SubMsgResult, SystemError, SystemResult, Uint128, WasmMsg, WasmQuery,
};
use cw20::{
    AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Expiration,
    TokenInfoResponse,
};

use crate::contract;
use crate::error::ContractError;
use crate::msg::ExecuteMsg;

pub type MockDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

/// How a mock token treats `TransferFrom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenBehavior {
    Honest,
    /// Reports success without moving anything
    Silent,
    /// Burns `bps` basis points of every pulled amount
    FeeOnTransfer { bps: u128 },
}

#[derive(Clone, Debug)]
pub struct MockToken {
    pub decimals: u8,
    pub behavior: TokenBehavior,
    pub balances: HashMap<String, u128>,
    pub allowances: HashMap<(String, String), u128>,
}

#[derive(Clone, Default)]
pub struct TokenBook(Arc<Mutex<HashMap<String, MockToken>>>);

impl TokenBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the querier's wasm smart queries to this book.
    pub fn install(&self, deps: &mut MockDeps) {
        let book = self.clone();
        deps.querier
            .update_wasm(move |query: &WasmQuery| book.handle_query(query));
    }

    pub fn add_token(&self, token: &Addr, decimals: u8) {
        self.0.lock().unwrap().insert(
            token.to_string(),
            MockToken {
                decimals,
                behavior: TokenBehavior::Honest,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
        );
    }

    pub fn set_behavior(&self, token: &Addr, behavior: TokenBehavior) {
        self.with_token(token, |t| t.behavior = behavior);
    }

    pub fn mint(&self, token: &Addr, holder: &Addr, amount: u128) {
        self.with_token(token, |t| {
            *t.balances.entry(holder.to_string()).or_default() += amount;
        });
    }

    pub fn approve(&self, token: &Addr, owner: &Addr, spender: &Addr, amount: u128) {
        self.with_token(token, |t| {
            t.allowances
                .insert((owner.to_string(), spender.to_string()), amount);
        });
    }

    pub fn balance(&self, token: &Addr, holder: &Addr) -> u128 {
        self.0
            .lock()
            .unwrap()
            .get(token.as_str())
            .and_then(|t| t.balances.get(holder.as_str()).copied())
            .unwrap_or(0)
    }

    fn with_token(&self, token: &Addr, f: impl FnOnce(&mut MockToken)) {
        let mut tokens = self.0.lock().unwrap();
        let entry = tokens
            .get_mut(token.as_str())
            .unwrap_or_else(|| panic!("unknown mock token {token}"));
        f(entry);
    }

    fn snapshot(&self) -> HashMap<String, MockToken> {
        self.0.lock().unwrap().clone()
    }

    fn restore(&self, snapshot: HashMap<String, MockToken>) {
        *self.0.lock().unwrap() = snapshot;
    }

    pub fn handle_query(&self, query: &WasmQuery) -> QuerierResult {
        let WasmQuery::Smart { contract_addr, msg } = query else {
            return SystemResult::Err(SystemError::UnsupportedRequest {
                kind: "only smart queries supported".to_string(),
            });
        };
        let tokens = self.0.lock().unwrap();
        let Some(token) = tokens.get(contract_addr) else {
            return SystemResult::Err(SystemError::NoSuchContract {
                addr: contract_addr.clone(),
            });
        };

        let res = match from_json::<Cw20QueryMsg>(msg) {
            Ok(Cw20QueryMsg::TokenInfo {}) => to_json_binary(&TokenInfoResponse {
                name: "Mock Stablecoin".to_string(),
                symbol: "MUSD".to_string(),
                decimals: token.decimals,
                total_supply: Uint128::new(token.balances.values().sum()),
            }),
            Ok(Cw20QueryMsg::Balance { address }) => to_json_binary(&BalanceResponse {
                balance: Uint128::new(token.balances.get(&address).copied().unwrap_or(0)),
            }),
            Ok(Cw20QueryMsg::Allowance { owner, spender }) => to_json_binary(&AllowanceResponse {
                allowance: Uint128::new(
                    token
                        .allowances
                        .get(&(owner, spender))
                        .copied()
                        .unwrap_or(0),
                ),
                expires: Expiration::Never {},
            }),
            _ => {
                return SystemResult::Err(SystemError::UnsupportedRequest {
                    kind: "cw20 query".to_string(),
                })
            }
        };
        SystemResult::Ok(res.into())
    }

    /// Apply a message emitted by `sender` to the book.
    pub fn apply(&self, sender: &Addr, msg: &CosmosMsg) -> Result<(), String> {
        let CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) = msg
        else {
            // Bank sends and the like are not tracked here
            return Ok(());
        };

        let mut tokens = self.0.lock().unwrap();
        let token = tokens
            .get_mut(contract_addr)
            .ok_or_else(|| format!("no such token {contract_addr}"))?;

        match from_json::<Cw20ExecuteMsg>(msg).map_err(|e| e.to_string())? {
            Cw20ExecuteMsg::TransferFrom {
                owner,
                recipient,
                amount,
            } => {
                let key = (owner.clone(), sender.to_string());
                let allowance = token.allowances.get(&key).copied().unwrap_or(0);
                if allowance < amount.u128() {
                    return Err("no allowance for this account".to_string());
                }
                token.allowances.insert(key, allowance - amount.u128());

                match token.behavior {
                    TokenBehavior::Honest => move_balance(token, &owner, &recipient, amount.u128(), 0),
                    TokenBehavior::Silent => Ok(()),
                    TokenBehavior::FeeOnTransfer { bps } => {
                        let fee = amount.u128() * bps / 10_000;
                        move_balance(token, &owner, &recipient, amount.u128(), fee)
                    }
                }
            }
            Cw20ExecuteMsg::Transfer { recipient, amount } => {
                move_balance(token, sender.as_str(), &recipient, amount.u128(), 0)
            }
            other => Err(format!("unsupported cw20 execute {other:?}")),
        }
    }
}

fn move_balance(
    token: &mut MockToken,
    from: &str,
    to: &str,
    amount: u128,
    burned: u128,
) -> Result<(), String> {
    let from_balance = token.balances.get(from).copied().unwrap_or(0);
    if from_balance < amount {
        return Err(format!("insufficient funds: balance {from_balance}, required {amount}"));
    }
    token.balances.insert(from.to_string(), from_balance - amount);
    *token.balances.entry(to.to_string()).or_default() += amount - burned;
    Ok(())
}

/// Run `msg` like a full transaction: execute, apply every emitted message to
/// the token book and feed submessage outcomes back through `reply` as their
/// `reply_on` asks. Reply events and attributes are merged into the returned
/// response. Contract storage and token movements are both rolled back if the
/// transaction fails.
pub fn execute_and_settle(
    deps: &mut MockDeps,
    book: &TokenBook,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let tokens = book.snapshot();
    let storage: Vec<Record> = deps
        .storage
        .range(None, None, Order::Ascending)
        .collect();

    let result = run_transaction(deps, book, env, info, msg);
    if result.is_err() {
        book.restore(tokens);
        deps.storage = MockStorage::new();
        for (key, value) in storage {
            deps.storage.set(&key, &value);
        }
    }
    result
}

fn run_transaction(
    deps: &mut MockDeps,
    book: &TokenBook,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let mut res = contract::execute(deps.as_mut(), env.clone(), info, msg)?;

    for sub in res.messages.clone() {
        // A failed submessage leaves no trace in the book
        let before = book.snapshot();
        let result = match book.apply(&env.contract.address, &sub.msg) {
            Ok(()) => {
                #[allow(deprecated)]
                let response = SubMsgResponse {
                    events: vec![],
                    data: None,
                    msg_responses: vec![],
                };
                SubMsgResult::Ok(response)
            }
            Err(reason) => {
                book.restore(before);
                SubMsgResult::Err(reason)
            }
        };

        let wants_reply = match (&result, &sub.reply_on) {
            (_, ReplyOn::Always) => true,
            (SubMsgResult::Ok(_), ReplyOn::Success) => true,
            (SubMsgResult::Err(_), ReplyOn::Error) => true,
            _ => false,
        };
        if !wants_reply {
            if let SubMsgResult::Err(reason) = result {
                return Err(ContractError::Std(StdError::generic_err(reason)));
            }
            continue;
        }

        let reply = Reply {
            id: sub.id,
            payload: Binary::default(),
            gas_used: 0,
            result,
        };
        let settled = contract::reply(deps.as_mut(), env.clone(), reply)?;
        res.attributes.extend(settled.attributes);
        res.events.extend(settled.events);
        res.messages.extend(settled.messages);
    }

    Ok(res)
}
