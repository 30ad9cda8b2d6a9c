use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::SaleMathError;
use crate::state::{SaleTerms, TierId};

/// Linear monthly release of a tier's purchase plus bonus.
///
/// ```text
/// months == 0           -> everything unlocks at `start`
/// now < start           -> 0
/// k = (now - start) / month_seconds
/// k + 1 <  months       -> (k + 1) * (total / months)
/// k + 1 >= months       -> total
/// ```
///
/// The month beginning at `start` is released immediately. The last month
/// also releases the remainder left by the per-month truncation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VestingSchedule {
    pub start: i64,
    pub months: u32,
    pub month_seconds: i64,
}

impl VestingSchedule {
    pub fn new(start: i64, months: u32, month_seconds: i64) -> Result<Self> {
        require!(month_seconds > 0, SaleMathError::InvalidVestingPeriod);
        Ok(Self {
            start,
            months,
            month_seconds,
        })
    }

    pub fn monthly_increment(&self, total: u128) -> u128 {
        if self.months == 0 {
            return total;
        }
        total / self.months as u128
    }

    /// Cumulative entitlement at `now`, capped at `total`.
    pub fn unlocked(&self, total: u128, now: i64) -> u128 {
        if now < self.start {
            return 0;
        }
        if self.months == 0 {
            return total;
        }

        let elapsed_months = (now.saturating_sub(self.start) / self.month_seconds) as u128;
        let released_months = elapsed_months.saturating_add(1);
        if released_months >= self.months as u128 {
            return total;
        }
        // released_months < months, so this stays below total.
        self.monthly_increment(total) * released_months
    }

    pub fn claimable(&self, total: u128, claimed: u128, now: i64) -> u128 {
        self.unlocked(total, now).saturating_sub(claimed)
    }

    /// Timestamp at which every atom is unlocked.
    pub fn fully_vested_at(&self) -> i64 {
        let months = self.months.saturating_sub(1) as i64;
        self.start.saturating_add(months.saturating_mul(self.month_seconds))
    }
}

/// A buyer's position in one tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    pub total: u128,
    pub claimed: u128,
}

impl Allocation {
    pub fn claimable(&self, schedule: &VestingSchedule, now: i64) -> u128 {
        schedule.claimable(self.total, self.claimed, now)
    }

    /// Releases everything claimable at `now`.
    pub fn claim(&mut self, schedule: &VestingSchedule, now: i64) -> Result<u128> {
        let claimable = self.claimable(schedule, now);
        require!(claimable > 0, SaleMathError::NothingToClaim);

        self.claimed = self
            .claimed
            .checked_add(claimable)
            .ok_or(SaleMathError::Overflow)?;
        Ok(claimable)
    }

    pub fn remaining(&self) -> u128 {
        self.total - self.claimed
    }
}

/// Per-tier allocations of a single buyer, vesting under one `SaleTerms`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entitlements {
    terms: SaleTerms,
    allocations: BTreeMap<TierId, Allocation>,
}

impl Entitlements {
    pub fn new(terms: SaleTerms) -> Self {
        Self {
            terms,
            allocations: BTreeMap::new(),
        }
    }

    pub fn schedule(&self, tier: TierId) -> Result<VestingSchedule> {
        let tier_terms = self.terms.tier(tier)?;
        VestingSchedule::new(
            self.terms.vesting_start,
            tier_terms.vesting_months,
            self.terms.month_seconds,
        )
    }

    /// Adds a purchase, bonus already included, to the tier's allocation.
    pub fn record_purchase(&mut self, tier: TierId, amount_with_bonus: u128) -> Result<()> {
        self.terms.tier(tier)?;
        let allocation = self.allocations.entry(tier).or_default();
        allocation.total = allocation
            .total
            .checked_add(amount_with_bonus)
            .ok_or(SaleMathError::Overflow)?;
        Ok(())
    }

    pub fn allocation(&self, tier: TierId) -> Allocation {
        self.allocations.get(&tier).copied().unwrap_or_default()
    }

    pub fn claimable_for_tier(&self, tier: TierId, now: i64) -> Result<u128> {
        let schedule = self.schedule(tier)?;
        Ok(self.allocation(tier).claimable(&schedule, now))
    }

    pub fn total_claimable(&self, now: i64) -> Result<u128> {
        let mut total: u128 = 0;
        for tier in self.allocations.keys() {
            total = total
                .checked_add(self.claimable_for_tier(*tier, now)?)
                .ok_or(SaleMathError::Overflow)?;
        }
        Ok(total)
    }

    /// Claims every tier at once, the way the contract's `claimTokens` does.
    pub fn claim_all(&mut self, now: i64) -> Result<u128> {
        let mut claimed: u128 = 0;
        let tiers: Vec<TierId> = self.allocations.keys().copied().collect();
        for tier in tiers {
            let schedule = self.schedule(tier)?;
            let allocation = self.allocations.entry(tier).or_default();
            if allocation.claimable(&schedule, now) == 0 {
                continue;
            }
            claimed = claimed
                .checked_add(allocation.claim(&schedule, now)?)
                .ok_or(SaleMathError::Overflow)?;
        }
        require!(claimed > 0, SaleMathError::NothingToClaim);
        Ok(claimed)
    }

    pub fn total_claimed(&self) -> u128 {
        self.allocations.values().map(|a| a.claimed).sum()
    }
}
