//! Integration tests for the stable presale.
//!
//! These drive the contract through its `instantiate` / `execute` / `reply` /
//! `query` entry points with `cosmwasm_std::testing` mocks. Stablecoins are
//! simulated by the contract crate's in-memory CW20 token book, which settles
//! emitted transfers and feeds the purchase reply back into the contract.
//!
//! Run:
//! ```bash
//! cargo test -p stable-presale-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env};
use cosmwasm_std::{from_json, Addr, Env, Response, Uint128};
use stable_presale::contract::{instantiate, query};
use stable_presale::msg::{ExecuteMsg, InstantiateMsg, QueryMsg, StatusResponse};
use stable_presale::testing::{execute_and_settle, MockDeps, TokenBook};
use stable_presale::ContractError;
use stable_presale_common::{ParticipantEntry, Phase};

// ─── Constants ───

const DAY: u64 = 86_400;
/// 10^12: converts whole 6-decimal accounting units into 18-decimal base units
const E12: u128 = 1_000_000_000_000;

// ─── Harness ───

struct Sale {
    deps: MockDeps,
    book: TokenBook,
    env: Env,
    owner: Addr,
    beneficiary: Addr,
    /// 6 decimals
    usdc: Addr,
    /// 18 decimals
    dai: Addr,
}

struct SaleParams {
    min: u128,
    max: u128,
    cap: u128,
}

impl Sale {
    fn new(params: SaleParams) -> Self {
        let mut deps = mock_dependencies();
        let book = TokenBook::new();
        book.install(&mut deps);

        let usdc = deps.api.addr_make("usdc");
        let dai = deps.api.addr_make("dai");
        book.add_token(&usdc, 6);
        book.add_token(&dai, 18);

        let owner = deps.api.addr_make("owner");
        let beneficiary = deps.api.addr_make("beneficiary");
        let env = mock_env();

        let msg = InstantiateMsg {
            owner: owner.to_string(),
            beneficiary: beneficiary.to_string(),
            min_per_account: Uint128::new(params.min),
            max_per_account: Uint128::new(params.max),
            cap: Uint128::new(params.cap),
            start_time: env.block.time.seconds(),
            duration: 7 * DAY,
            accepted_assets: vec![usdc.to_string(), dai.to_string()],
            accounting_decimals: None,
        };
        let deployer = deps.api.addr_make("deployer");
        instantiate(deps.as_mut(), env.clone(), message_info(&deployer, &[]), msg).unwrap();

        Sale {
            deps,
            book,
            env,
            owner,
            beneficiary,
            usdc,
            dai,
        }
    }

    fn account(&self, name: &str) -> Addr {
        self.deps.api.addr_make(name)
    }

    fn exec(&mut self, sender: &Addr, msg: ExecuteMsg) -> Result<Response, ContractError> {
        execute_and_settle(
            &mut self.deps,
            &self.book,
            self.env.clone(),
            message_info(sender, &[]),
            msg,
        )
    }

    fn whitelist(&mut self, accounts: &[&Addr]) {
        let owner = self.owner.clone();
        self.exec(
            &owner,
            ExecuteMsg::AddToWhitelist {
                addresses: accounts.iter().map(|a| a.to_string()).collect(),
            },
        )
        .unwrap();
    }

    /// Mint and approve `raw` base units, then buy with them.
    fn buy(&mut self, buyer: &Addr, token: &Addr, raw: u128) -> Result<Response, ContractError> {
        let contract = self.env.contract.address.clone();
        self.book.mint(token, buyer, raw);
        self.book.approve(token, buyer, &contract, raw);
        self.exec(
            buyer,
            ExecuteMsg::BuyWith {
                asset: token.to_string(),
                amount: Uint128::new(raw),
            },
        )
    }

    fn query<T: serde::de::DeserializeOwned>(&self, msg: QueryMsg) -> T {
        from_json(query(self.deps.as_ref(), self.env.clone(), msg).unwrap()).unwrap()
    }

    fn query_err(&self, msg: QueryMsg) -> ContractError {
        query(self.deps.as_ref(), self.env.clone(), msg).unwrap_err()
    }

    fn balance_of(&self, who: &Addr) -> Uint128 {
        self.query(QueryMsg::BalanceOf {
            address: who.to_string(),
        })
    }

    fn status(&self) -> StatusResponse {
        self.query(QueryMsg::Status {})
    }

    fn advance(&mut self, seconds: u64) {
        self.env.block.time = self.env.block.time.plus_seconds(seconds);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_scenario_a_mixed_decimals_fill_account_cap() {
    let mut sale = Sale::new(SaleParams {
        min: 20_000,
        max: 50_000,
        cap: 20_000_000,
    });
    let x = sale.account("x");
    sale.whitelist(&[&x]);
    let usdc = sale.usdc.clone();
    let dai = sale.dai.clone();

    sale.buy(&x, &usdc, 35_000).unwrap();
    sale.buy(&x, &dai, 15_000 * E12).unwrap();

    assert_eq!(sale.balance_of(&x), Uint128::new(50_000));
    let remaining: Uint128 = sale.query(QueryMsg::RemainingAllocation {
        address: x.to_string(),
    });
    assert!(remaining.is_zero());
    let max: Uint128 = sale.query(QueryMsg::MaxAllocation {
        address: x.to_string(),
    });
    assert_eq!(max, Uint128::new(50_000));

    for raw in [20_000u128, 50_000] {
        let err = sale.buy(&x, &usdc, raw).unwrap_err();
        assert!(matches!(err, ContractError::AmountTooHigh { .. }));
    }
    let err = sale.buy(&x, &dai, 20_000 * E12).unwrap_err();
    assert!(matches!(err, ContractError::AmountTooHigh { .. }));

    // Both stablecoins landed in the contract
    let contract = sale.env.contract.address.clone();
    assert_eq!(sale.book.balance(&usdc, &contract), 35_000);
    assert_eq!(sale.book.balance(&dai, &contract), 15_000 * E12);
}

#[test]
fn test_scenario_b_unlimited_account() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 20_000_000,
    });
    let y = sale.account("y");
    sale.whitelist(&[&y]);
    let usdc = sale.usdc.clone();

    sale.buy(&y, &usdc, 100).unwrap();
    sale.buy(&y, &usdc, 150_000).unwrap();
    assert_eq!(sale.balance_of(&y), Uint128::new(150_100));

    // Unlimited means "max allocation 0", bounded by the cap only
    let max: Uint128 = sale.query(QueryMsg::MaxAllocation {
        address: y.to_string(),
    });
    assert!(max.is_zero());
    let remaining: Uint128 = sale.query(QueryMsg::RemainingAllocation {
        address: y.to_string(),
    });
    assert_eq!(remaining, Uint128::new(20_000_000 - 150_100));

    let err = sale.buy(&y, &usdc, 20_000_000).unwrap_err();
    assert!(matches!(err, ContractError::AmountTooHigh { .. }));
}

#[test]
fn test_scenario_c_end_presale_after_sellout() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 50_000,
    });
    let owner = sale.owner.clone();
    let z = sale.account("z");
    sale.whitelist(&[&z]);
    let usdc = sale.usdc.clone();

    let err = sale.exec(&owner, ExecuteMsg::EndPresale {}).unwrap_err();
    assert!(matches!(err, ContractError::CapNotReached { .. }));

    sale.buy(&z, &usdc, 50_000).unwrap();
    let live: bool = sale.query(QueryMsg::IsLive {});
    assert!(live, "sold out sale stays live until the owner closes it");

    sale.exec(&owner, ExecuteMsg::EndPresale {}).unwrap();
    let live: bool = sale.query(QueryMsg::IsLive {});
    assert!(!live);
    assert!(sale.status().ended_by_admin);

    // Permanently: time passing does not revive it
    sale.advance(DAY);
    assert_eq!(sale.status().phase, Phase::Ended);
    let err = sale.buy(&z, &usdc, 1).unwrap_err();
    assert!(matches!(err, ContractError::SaleNotActive));
}

#[test]
fn test_scenario_d_withdraw_sweeps_accepted_assets() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 20_000_000,
    });
    let owner = sale.owner.clone();
    let beneficiary = sale.beneficiary.clone();
    let alice = sale.account("alice");
    let bob = sale.account("bob");
    sale.whitelist(&[&alice, &bob]);
    let usdc = sale.usdc.clone();
    let dai = sale.dai.clone();
    let contract = sale.env.contract.address.clone();

    sale.buy(&alice, &usdc, 40_000).unwrap();
    sale.buy(&bob, &dai, 25_000 * E12).unwrap();
    // Stray transfer of an accepted asset, never credited to anyone
    sale.book.mint(&usdc, &contract, 7);

    let err = sale.exec(&beneficiary, ExecuteMsg::WithdrawFunds {}).unwrap_err();
    assert!(matches!(err, ContractError::NotEnded));

    sale.advance(7 * DAY);

    for caller in [&owner, &alice] {
        let err = sale.exec(caller, ExecuteMsg::WithdrawFunds {}).unwrap_err();
        assert!(matches!(err, ContractError::NotBeneficiary));
    }

    let res = sale.exec(&beneficiary, ExecuteMsg::WithdrawFunds {}).unwrap();
    assert_eq!(res.messages.len(), 2);
    assert!(res.events.iter().any(|e| e.ty == "presale_funds_withdrawn"));

    assert_eq!(sale.book.balance(&usdc, &contract), 0);
    assert_eq!(sale.book.balance(&dai, &contract), 0);
    assert_eq!(sale.book.balance(&usdc, &beneficiary), 40_007);
    assert_eq!(sale.book.balance(&dai, &beneficiary), 25_000 * E12);

    // Accounting is untouched by the sweep
    assert_eq!(sale.status().collected, Uint128::new(65_000));
}

#[test]
fn test_scenario_e_participant_enumeration() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 20_000_000,
    });

    // Empty ledger
    let count: u64 = sale.query(QueryMsg::ParticipantCount {});
    assert_eq!(count, 0);
    assert!(matches!(
        sale.query_err(QueryMsg::ParticipantAt { index: 0 }),
        ContractError::IndexOutOfRange { index: 0, count: 0 }
    ));
    assert!(matches!(
        sale.query_err(QueryMsg::ParticipantsInRange { from: 0, to: 0 }),
        ContractError::InvalidRange { .. }
    ));

    let carol = sale.account("carol");
    let alice = sale.account("alice");
    let bob = sale.account("bob");
    sale.whitelist(&[&carol, &alice, &bob]);
    let usdc = sale.usdc.clone();
    let dai = sale.dai.clone();

    sale.buy(&carol, &usdc, 300).unwrap();
    sale.buy(&alice, &dai, 100 * E12).unwrap();
    sale.buy(&carol, &usdc, 50).unwrap();
    sale.buy(&bob, &usdc, 200).unwrap();

    let count: u64 = sale.query(QueryMsg::ParticipantCount {});
    assert_eq!(count, 3);

    let all: Vec<ParticipantEntry> = sale.query(QueryMsg::ParticipantsInRange {
        from: 0,
        to: count - 1,
    });
    let expected = [(&carol, 350u128), (&alice, 100), (&bob, 200)];
    assert_eq!(all.len(), expected.len());
    for (i, (who, balance)) in expected.iter().enumerate() {
        assert_eq!(&all[i].address, *who);
        assert_eq!(all[i].balance, Uint128::new(*balance));
        assert_eq!(all[i].index, i as u64);

        let at: ParticipantEntry = sale.query(QueryMsg::ParticipantAt { index: i as u64 });
        assert_eq!(at, all[i]);
    }

    let tail: Vec<ParticipantEntry> = sale.query(QueryMsg::ParticipantsInRange { from: 1, to: 2 });
    assert_eq!(tail, all[1..].to_vec());

    assert!(matches!(
        sale.query_err(QueryMsg::ParticipantAt { index: 3 }),
        ContractError::IndexOutOfRange { index: 3, count: 3 }
    ));
    assert!(matches!(
        sale.query_err(QueryMsg::ParticipantsInRange { from: 2, to: 1 }),
        ContractError::InvalidRange { from: 2, to: 1, .. }
    ));
    assert!(matches!(
        sale.query_err(QueryMsg::ParticipantsInRange { from: 0, to: 3 }),
        ContractError::InvalidRange { to: 3, .. }
    ));
}

#[test]
fn test_round_change_invalidates_membership() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 20_000_000,
    });
    let owner = sale.owner.clone();
    let early = sale.account("early");
    sale.whitelist(&[&early]);
    let usdc = sale.usdc.clone();

    sale.buy(&early, &usdc, 1_000).unwrap();

    let res = sale
        .exec(&owner, ExecuteMsg::AdvanceRound { new_round: 2 })
        .unwrap();
    assert!(res
        .events
        .iter()
        .any(|e| e.ty == "presale_whitelist_round_changed"));

    let err = sale.buy(&early, &usdc, 1_000).unwrap_err();
    assert!(matches!(err, ContractError::NotWhitelisted { .. }));
    let remaining: Uint128 = sale.query(QueryMsg::RemainingAllocation {
        address: early.to_string(),
    });
    assert!(remaining.is_zero());

    // Balance from round 1 survives; re-adding restores access
    assert_eq!(sale.balance_of(&early), Uint128::new(1_000));
    sale.whitelist(&[&early]);
    sale.buy(&early, &usdc, 1_000).unwrap();
    assert_eq!(sale.balance_of(&early), Uint128::new(2_000));
    assert_eq!(sale.status().current_round, 2);
}

#[test]
fn test_whitelist_add_is_idempotent() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 1_000,
    });
    let alice = sale.account("alice");
    sale.whitelist(&[&alice]);
    sale.whitelist(&[&alice, &alice]);

    let listed: bool = sale.query(QueryMsg::IsWhitelisted {
        address: alice.to_string(),
    });
    assert!(listed);
}

#[test]
fn test_open_sale_admits_anyone() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 1_000,
    });
    let owner = sale.owner.clone();
    let walk_in = sale.account("walk_in");
    let usdc = sale.usdc.clone();

    let err = sale.buy(&walk_in, &usdc, 10).unwrap_err();
    assert!(matches!(err, ContractError::NotWhitelisted { .. }));

    let res = sale
        .exec(&owner, ExecuteMsg::SetWhitelistedOnly { enabled: false })
        .unwrap();
    assert!(res.events.iter().any(|e| e.ty == "presale_whitelist_changed"));

    sale.buy(&walk_in, &usdc, 10).unwrap();
    assert_eq!(sale.balance_of(&walk_in), Uint128::new(10));
}

#[test]
fn test_min_applies_per_purchase() {
    let mut sale = Sale::new(SaleParams {
        min: 20_000,
        max: 0,
        cap: 20_000_000,
    });
    let alice = sale.account("alice");
    sale.whitelist(&[&alice]);
    let usdc = sale.usdc.clone();

    let err = sale.buy(&alice, &usdc, 19_999).unwrap_err();
    assert!(matches!(err, ContractError::AmountTooLow { .. }));

    sale.buy(&alice, &usdc, 20_000).unwrap();
    // A qualifying balance does not exempt later small top-ups
    let err = sale.buy(&alice, &usdc, 5_000).unwrap_err();
    assert!(matches!(err, ContractError::AmountTooLow { .. }));
}

#[test]
fn test_collected_tracks_every_purchase() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 10_000,
    });
    let buyers: Vec<Addr> = (0..4).map(|i| sale.account(&format!("buyer{i}"))).collect();
    let refs: Vec<&Addr> = buyers.iter().collect();
    sale.whitelist(&refs);
    let usdc = sale.usdc.clone();
    let dai = sale.dai.clone();

    let purchases = [
        (0usize, &usdc, 2_500u128, 2_500u128),
        (1, &dai, 3_000 * E12, 3_000),
        (0, &usdc, 1_500, 1_500),
        (2, &dai, 1_999 * E12 + 123, 1_999),
        (3, &usdc, 1_002, 1_002),
    ];

    let mut expected_collected = 0u128;
    let mut last_balances = vec![Uint128::zero(); buyers.len()];
    for (who, token, raw, normalized) in purchases {
        let before = sale.status().collected;
        sale.buy(&buyers[who], token, raw).unwrap();
        let after = sale.status().collected;

        expected_collected += normalized;
        assert_eq!(after, before + Uint128::new(normalized));
        assert_eq!(after, Uint128::new(expected_collected));
        assert!(after <= Uint128::new(10_000));

        for (i, b) in buyers.iter().enumerate() {
            let now = sale.balance_of(b);
            assert!(now >= last_balances[i], "balances never decrease");
            last_balances[i] = now;
        }
    }

    // 10_000 - 9_001 = 999 left
    let err = sale.buy(&buyers[3], &usdc, 1_000).unwrap_err();
    assert!(matches!(
        err,
        ContractError::InsufficientRemainingCap { remaining, .. } if remaining == Uint128::new(999)
    ));
    let sum: Uint128 = last_balances.iter().sum();
    assert_eq!(sum, sale.status().collected);
}

#[test]
fn test_recovery_after_end() {
    let mut sale = Sale::new(SaleParams {
        min: 0,
        max: 0,
        cap: 1_000,
    });
    let owner = sale.owner.clone();
    let contract = sale.env.contract.address.clone();
    let airdrop = sale.account("airdrop_token");
    sale.book.add_token(&airdrop, 9);
    sale.book.mint(&airdrop, &contract, 5_000);

    let recover = ExecuteMsg::RecoverToken {
        token: airdrop.to_string(),
    };
    let err = sale.exec(&owner, recover.clone()).unwrap_err();
    assert!(matches!(err, ContractError::NotEnded));

    sale.advance(7 * DAY);
    let res = sale.exec(&owner, recover).unwrap();
    assert!(res.events.iter().any(|e| e.ty == "presale_token_recovered"));
    assert_eq!(sale.book.balance(&airdrop, &owner), 5_000);
    assert_eq!(sale.book.balance(&airdrop, &contract), 0);

    // Nothing of this denom held: no message
    let res = sale
        .exec(
            &owner,
            ExecuteMsg::RecoverNative {
                denom: "uatom".to_string(),
            },
        )
        .unwrap();
    assert!(res.messages.is_empty());
}
