//! Delivery price calculation.

/// Computes the delivery price in rubles.
///
/// Formula: `(weight_kg * 0.5 + cost_adjustment_usd * 0.01) * usd_to_rub`.
/// The result is kept at full precision; rounding happens only at
/// presentation (the analytics summary rounds to 2 decimals).
pub fn delivery_price(weight_kg: f64, cost_adjustment_usd: f64, usd_to_rub: f64) -> f64 {
    (weight_kg * 0.5 + cost_adjustment_usd * 0.01) * usd_to_rub
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_example() {
        // 2 kg, 10 USD adjustment, rate 80 -> 88 RUB
        let price = delivery_price(2.0, 10.0, 80.0);
        assert!((price - 88.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rate_zeroes_the_price() {
        assert_eq!(delivery_price(50.0, 100.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn price_scales_linearly_with_rate(
            weight in 0.01f64..100.0,
            cost in 0.1f64..1e6,
            rate in 1.0f64..500.0,
        ) {
            let base = delivery_price(weight, cost, rate);
            let doubled = delivery_price(weight, cost, rate * 2.0);
            prop_assert!((doubled - base * 2.0).abs() < 1e-6 * doubled.abs().max(1.0));
        }

        #[test]
        fn price_is_positive_for_valid_inputs(
            weight in 0.01f64..100.0,
            cost in 0.1f64..1e6,
            rate in 1.0f64..500.0,
        ) {
            prop_assert!(delivery_price(weight, cost, rate) > 0.0);
        }
    }
}
