use cosmwasm_std::{OverflowError, OverflowOperation, Uint128};

/// Accounting precision used by the ledger when the sale does not configure
/// one. Matches the 6-decimal quote unit of the common USD stablecoins.
pub const DEFAULT_ACCOUNTING_DECIMALS: u8 = 6;

/// Largest power of ten representable in a `u128`.
const MAX_U128_EXPONENT: u32 = 38;

/// Rescale `raw` from `from_decimals` to `to_decimals`.
///
/// Scaling down truncates toward zero, so dust below the accounting
/// precision is dropped. Scaling up fails on overflow.
///
/// `normalize_amount(1_500_000, 6, 2) == 150`
/// `normalize_amount(15, 0, 6) == 15_000_000`
pub fn normalize_amount(
    raw: Uint128,
    from_decimals: u8,
    to_decimals: u8,
) -> Result<Uint128, OverflowError> {
    match from_decimals.cmp(&to_decimals) {
        std::cmp::Ordering::Equal => Ok(raw),
        std::cmp::Ordering::Greater => {
            let exp = u32::from(from_decimals - to_decimals);
            if exp > MAX_U128_EXPONENT {
                // 10^exp exceeds every u128, the quotient is always zero
                return Ok(Uint128::zero());
            }
            Ok(raw / Uint128::new(10u128.pow(exp)))
        }
        std::cmp::Ordering::Less => {
            let exp = u32::from(to_decimals - from_decimals);
            if exp > MAX_U128_EXPONENT {
                if raw.is_zero() {
                    return Ok(raw);
                }
                return Err(OverflowError::new(OverflowOperation::Mul));
            }
            raw.checked_mul(Uint128::new(10u128.pow(exp)))
        }
    }
}
