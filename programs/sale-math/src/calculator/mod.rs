pub mod bonus;
pub mod pricing;
pub mod units;

pub use bonus::*;
pub use pricing::*;
pub use units::*;

use anchor_lang::prelude::*;

use crate::state::{DecimalsFactor, SaleTerms, Stablecoin, TierId};
use crate::vesting::{Entitlements, VestingSchedule};

/// Off-chain mirror of the sale contract's conversion arithmetic.
///
/// Holds only the immutable [`SaleTerms`]; every method is a pure function
/// of its arguments and those terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterCalculator {
    terms: SaleTerms,
}

impl ConverterCalculator {
    pub fn new(terms: SaleTerms) -> Result<Self> {
        terms.validate()?;
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &SaleTerms {
        &self.terms
    }

    pub fn to_display(&self, atoms: u128, factor: DecimalsFactor) -> Truncated {
        units::to_display(atoms, factor)
    }

    pub fn to_atoms(&self, display: u128, factor: DecimalsFactor) -> Result<u128> {
        units::to_atoms(display, factor)
    }

    pub fn sale_atoms(&self, display: u128) -> Result<u128> {
        units::to_atoms(display, self.terms.sale_token)
    }

    pub fn sale_display(&self, atoms: u128) -> Truncated {
        units::to_display(atoms, self.terms.sale_token)
    }

    pub fn stable_atoms(&self, coin: Stablecoin, display: u128) -> Result<u128> {
        units::to_atoms(display, self.terms.stablecoin(coin))
    }

    pub fn stable_display(&self, coin: Stablecoin, atoms: u128) -> Truncated {
        units::to_display(atoms, self.terms.stablecoin(coin))
    }

    pub fn spend_to_purchase_atoms(
        &self,
        coin: Stablecoin,
        stable_atoms: u128,
        tier: TierId,
    ) -> Result<u128> {
        pricing::spend_to_purchase_atoms(&self.terms, coin, stable_atoms, tier)
    }

    pub fn purchase_cost_in_stable_atoms(
        &self,
        coin: Stablecoin,
        sale_atoms: u128,
        tier: TierId,
    ) -> Result<u128> {
        pricing::purchase_cost_in_stable_atoms(&self.terms, coin, sale_atoms, tier)
    }

    pub fn discounted_cost(&self, stable_atoms: u128) -> u128 {
        pricing::discounted_cost(&self.terms, stable_atoms)
    }

    pub fn meets_minimum_purchase(&self, coin: Stablecoin, stable_atoms: u128) -> bool {
        pricing::meets_minimum_purchase(&self.terms, coin, stable_atoms)
    }

    pub fn bonus_for_tier(&self, sale_atoms: u128, tier: TierId) -> Result<u128> {
        bonus::bonus_for_tier(&self.terms, sale_atoms, tier)
    }

    pub fn total_with_bonus_for_tier(&self, sale_atoms: u128, tier: TierId) -> Result<u128> {
        bonus::total_with_bonus_for_tier(&self.terms, sale_atoms, tier)
    }

    pub fn vesting_schedule(&self, tier: TierId) -> Result<VestingSchedule> {
        let tier_terms = self.terms.tier(tier)?;
        VestingSchedule::new(
            self.terms.vesting_start,
            tier_terms.vesting_months,
            self.terms.month_seconds,
        )
    }

    /// Per-month claim for `sale_atoms` bought in `tier`, bonus included.
    pub fn monthly_claim(&self, sale_atoms: u128, tier: TierId) -> Result<u128> {
        let total = self.total_with_bonus_for_tier(sale_atoms, tier)?;
        Ok(self.vesting_schedule(tier)?.monthly_increment(total))
    }

    pub fn entitlements(&self) -> Entitlements {
        Entitlements::new(self.terms.clone())
    }
}
