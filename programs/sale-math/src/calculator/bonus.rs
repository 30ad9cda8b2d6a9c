use anchor_lang::prelude::*;

use crate::constants::PERCENT_DENOMINATOR;
use crate::errors::SaleMathError;
use crate::state::{SaleTerms, TierId};

pub fn bonus_for_tier(terms: &SaleTerms, sale_atoms: u128, tier: TierId) -> Result<u128> {
    let bonus_percent = terms.tier(tier)?.bonus_percent as u128;
    let bonus = sale_atoms
        .checked_mul(bonus_percent)
        .ok_or(SaleMathError::Overflow)?
        / PERCENT_DENOMINATOR;
    Ok(bonus)
}

pub fn total_with_bonus_for_tier(terms: &SaleTerms, sale_atoms: u128, tier: TierId) -> Result<u128> {
    let bonus = bonus_for_tier(terms, sale_atoms, tier)?;
    let total = sale_atoms
        .checked_add(bonus)
        .ok_or(SaleMathError::Overflow)?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;
    use proptest::prelude::*;

    const GSX: u128 = 1_000_000_000_000_000_000;

    fn terms() -> SaleTerms {
        SaleTerms::v2_default(0).unwrap()
    }

    #[test]
    fn tier_one_pays_85_percent() {
        assert_eq!(bonus_for_tier(&terms(), 100 * GSX, 1).unwrap(), 85 * GSX);
        assert_eq!(
            total_with_bonus_for_tier(&terms(), 100 * GSX, 1).unwrap(),
            185 * GSX
        );
    }

    #[test]
    fn tier_three_pays_nothing() {
        assert_eq!(bonus_for_tier(&terms(), 100 * GSX, 3).unwrap(), 0);
        assert_eq!(
            total_with_bonus_for_tier(&terms(), 100 * GSX, 3).unwrap(),
            100 * GSX
        );
    }

    #[test]
    fn bonus_truncates() {
        // 3 * 25 / 100 = 0.75
        assert_eq!(bonus_for_tier(&terms(), 3, 2).unwrap(), 0);
        assert_eq!(bonus_for_tier(&terms(), 7, 2).unwrap(), 1);
    }

    proptest! {
        #[test]
        fn bonus_matches_formula(amount in 0u128..=u128::MAX / 100, tier in 1u8..=3) {
            let bonus_percent = terms().tier(tier).unwrap().bonus_percent as u128;
            let bonus = bonus_for_tier(&terms(), amount, tier).unwrap();
            prop_assert_eq!(bonus, amount * bonus_percent / 100);
            prop_assert_eq!(
                total_with_bonus_for_tier(&terms(), amount, tier).unwrap(),
                amount + bonus
            );
        }

        #[test]
        fn unconfigured_tier_always_fails(amount in any::<u128>(), tier in 4u8..=u8::MAX) {
            prop_assert_eq!(
                bonus_for_tier(&terms(), amount, tier).unwrap_err(),
                Error::from(SaleMathError::UnknownTier)
            );
        }
    }
}
