use anchor_lang::prelude::*;

use crate::calculator::bonus::bonus_for_tier;
use crate::constants::{CENTS_PER_DOLLAR, PERCENT_DENOMINATOR};
use crate::errors::SaleMathError;
use crate::state::{SaleTerms, Stablecoin, TierId};

/// Sale-token atoms bought by spending `stable_atoms`, bonus included.
///
/// Every division truncates in place, in the same order as the contract:
/// `stable * sale_factor * 100 / price / stable_factor`. Reordering the
/// divisions changes the result.
pub fn spend_to_purchase_atoms(
    terms: &SaleTerms,
    coin: Stablecoin,
    stable_atoms: u128,
    tier: TierId,
) -> Result<u128> {
    // Fail on an unconfigured tier before touching the amount.
    terms.tier(tier)?;
    let price_cents = terms.pricing.price_cents(tier)? as u128;

    let base = stable_atoms
        .checked_mul(terms.sale_token.get())
        .ok_or(SaleMathError::Overflow)?
        .checked_mul(CENTS_PER_DOLLAR)
        .ok_or(SaleMathError::Overflow)?
        .checked_div(price_cents)
        .ok_or(SaleMathError::InvalidPrice)?
        / terms.stablecoin(coin).get();

    let bonus = bonus_for_tier(terms, base, tier)?;
    let total = base.checked_add(bonus).ok_or(SaleMathError::Overflow)?;
    Ok(total)
}

/// Stablecoin atoms charged for `sale_atoms` at the tier's price, before any
/// referral discount.
pub fn purchase_cost_in_stable_atoms(
    terms: &SaleTerms,
    coin: Stablecoin,
    sale_atoms: u128,
    tier: TierId,
) -> Result<u128> {
    let price_cents = terms.pricing.price_cents(tier)? as u128;

    let cost = sale_atoms
        .checked_mul(terms.stablecoin(coin).get())
        .ok_or(SaleMathError::Overflow)?
        .checked_mul(price_cents)
        .ok_or(SaleMathError::Overflow)?
        / CENTS_PER_DOLLAR
        / terms.sale_token.get();
    Ok(cost)
}

/// Cost after the referred-supporter discount. The contract divides first,
/// so sub-cent remainders are dropped before the discount applies.
pub fn discounted_cost(terms: &SaleTerms, stable_atoms: u128) -> u128 {
    let kept_percent = PERCENT_DENOMINATOR.saturating_sub(terms.referral_discount_percent as u128);
    stable_atoms / PERCENT_DENOMINATOR * kept_percent
}

pub fn meets_minimum_purchase(terms: &SaleTerms, coin: Stablecoin, stable_atoms: u128) -> bool {
    match (terms.minimum_purchase_usd as u128).checked_mul(terms.stablecoin(coin).get()) {
        Some(minimum) => stable_atoms >= minimum,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;
    use crate::state::Pricing;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    const GSX: u128 = 1_000_000_000_000_000_000;
    const USDC: u128 = 1_000_000;

    fn terms() -> SaleTerms {
        SaleTerms::v2_default(0).unwrap()
    }

    #[test]
    fn tier_three_spends_85_usdc_for_100_tokens() {
        let bought = spend_to_purchase_atoms(&terms(), Stablecoin::Usdc, 85 * USDC, 3).unwrap();
        assert_eq!(bought, 100 * GSX);
    }

    #[test]
    fn tier_one_adds_bonus_on_top() {
        let bought = spend_to_purchase_atoms(&terms(), Stablecoin::Usdt, 85 * USDC, 1).unwrap();
        assert_eq!(bought, 185 * GSX);
    }

    #[test]
    fn divisions_truncate_left_to_right() {
        // 1 * 10^18 * 100 / 85 = 1176470588235294117 (truncated), then / 10^6.
        let bought = spend_to_purchase_atoms(&terms(), Stablecoin::Usdc, 1, 3).unwrap();
        assert_eq!(bought, 1_176_470_588_235);
    }

    #[test]
    fn unknown_tier_fails_regardless_of_amount() {
        for amount in [0, 1, 85 * USDC, u128::MAX] {
            assert_eq!(
                spend_to_purchase_atoms(&terms(), Stablecoin::Usdc, amount, 4).unwrap_err(),
                Error::from(SaleMathError::UnknownTier)
            );
        }
    }

    #[test]
    fn huge_spend_overflows_instead_of_wrapping() {
        assert_eq!(
            spend_to_purchase_atoms(&terms(), Stablecoin::Usdc, u128::MAX, 1).unwrap_err(),
            Error::from(SaleMathError::Overflow)
        );
    }

    #[test]
    fn zero_price_is_an_error_not_a_panic() {
        let mut terms = terms();
        terms.pricing = Pricing::Flat { price_cents: 0 };
        assert_eq!(
            spend_to_purchase_atoms(&terms, Stablecoin::Usdc, 1, 1).unwrap_err(),
            Error::from(SaleMathError::InvalidPrice)
        );
        // Pricing a purchase at zero costs nothing; it never divides by the price.
        assert_eq!(
            purchase_cost_in_stable_atoms(&terms, Stablecoin::Usdc, 100 * GSX, 1).unwrap(),
            0
        );
    }

    #[test]
    fn cost_of_100_tokens_is_85_usdc() {
        let cost = purchase_cost_in_stable_atoms(&terms(), Stablecoin::Usdc, 100 * GSX, 1).unwrap();
        assert_eq!(cost, 85 * USDC);
    }

    #[test]
    fn per_tier_pricing_uses_the_tier_price() {
        let terms =
            SaleTerms::v1_default(0, BTreeMap::from([(1, 50), (2, 70), (3, 85)])).unwrap();
        assert_eq!(
            spend_to_purchase_atoms(&terms, Stablecoin::Usdc, 50 * USDC, 1).unwrap(),
            100 * GSX
        );
        assert_eq!(
            purchase_cost_in_stable_atoms(&terms, Stablecoin::Usdc, 100 * GSX, 2).unwrap(),
            70 * USDC
        );
    }

    #[test]
    fn referral_discount_divides_first() {
        assert_eq!(discounted_cost(&terms(), 85 * USDC), 80_750_000);
        // 199 / 100 * 95 = 95, not 189.
        assert_eq!(discounted_cost(&terms(), 199), 95);
    }

    #[test]
    fn minimum_purchase_is_50_usd() {
        assert!(meets_minimum_purchase(&terms(), Stablecoin::Usdc, 50 * USDC));
        assert!(!meets_minimum_purchase(&terms(), Stablecoin::Usdc, 50 * USDC - 1));
        // 10 tokens at 85 cents.
        let small = purchase_cost_in_stable_atoms(&terms(), Stablecoin::Usdc, 10 * GSX, 1).unwrap();
        assert!(!meets_minimum_purchase(&terms(), Stablecoin::Usdc, small));
    }

    proptest! {
        #[test]
        fn purchase_is_monotonic_in_spend(
            a in 0u128..1_000_000_000_000_000,
            b in 0u128..1_000_000_000_000_000,
            tier in 1u8..=3,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_bought = spend_to_purchase_atoms(&terms(), Stablecoin::Usdc, low, tier).unwrap();
            let high_bought = spend_to_purchase_atoms(&terms(), Stablecoin::Usdc, high, tier).unwrap();
            prop_assert!(low_bought <= high_bought);
        }

        #[test]
        fn unconfigured_tier_fails_for_any_spend(amount in any::<u128>(), tier in 4u8..=u8::MAX) {
            prop_assert_eq!(
                spend_to_purchase_atoms(&terms(), Stablecoin::Usdt, amount, tier).unwrap_err(),
                Error::from(SaleMathError::UnknownTier)
            );
        }
    }
}
