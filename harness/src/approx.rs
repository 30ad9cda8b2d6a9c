use alloy::primitives::U256;

/// True when `a` and `b` differ by at most `tolerance`.
pub fn approx_eq(a: U256, b: U256, tolerance: U256) -> bool {
    a.abs_diff(b) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tolerance_is_inclusive() {
        let base = U256::from(20_555_555_555_555_555_555u128);
        assert!(approx_eq(base, base + U256::from(10), U256::from(10)));
        assert!(!approx_eq(base, base + U256::from(11), U256::from(10)));
        assert!(approx_eq(base, base, U256::ZERO));
    }

    proptest! {
        #[test]
        fn symmetric(a in any::<u128>(), b in any::<u128>(), tol in any::<u64>()) {
            let (a, b, tol) = (U256::from(a), U256::from(b), U256::from(tol));
            prop_assert_eq!(approx_eq(a, b, tol), approx_eq(b, a, tol));
        }
    }
}
