use proptest::prelude::*;
use rust_decimal::Decimal;
use tiptime::prelude::*;

fn cents() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|c| Decimal::new(c, 2))
}

fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..10_000).prop_map(|p| Decimal::new(p, 2))
}

proptest! {
    #[test]
    fn rounded_tip_is_whole_and_within_one_unit(amount in cents(), pct in percent()) {
        let exact = tip_amount(amount, pct, false);
        let rounded = tip_amount(amount, pct, true);

        prop_assert!(rounded.fract().is_zero());
        prop_assert!(rounded >= exact);
        prop_assert!(rounded - exact < Decimal::ONE);
        prop_assert!(calculate_tip_in(TipLocale::EnUS, amount, pct, true).ends_with(".00"));
    }

    #[test]
    fn tip_is_never_negative_for_non_negative_inputs(amount in cents(), pct in percent(), round_up in any::<bool>()) {
        prop_assert!(tip_amount(amount, pct, round_up) >= Decimal::ZERO);

        let text = calculate_tip_in(TipLocale::EnUS, amount, pct, round_up);
        prop_assert!(text.starts_with('$'));
    }
}
