use ct_memcmp::{compare, compare_with, Comparator, EarlyExit, Strategy as CtStrategy, Verdict};
use proptest::prelude::*;

fn strategies() -> impl Strategy<Value = CtStrategy> {
    prop::sample::select(CtStrategy::ALL.to_vec())
}

// Pairs that share a random prefix, so differences land anywhere.
fn buffer_pairs() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (
        prop::collection::vec(any::<u8>(), 0..64),
        prop::collection::vec(any::<u8>(), 0..64),
        prop::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(prefix, mut a, mut b)| {
            let len = a.len().min(b.len());
            a.truncate(len);
            b.truncate(len);
            let mut left = prefix.clone();
            left.extend(a);
            let mut right = prefix;
            right.extend(b);
            (left, right)
        })
}

proptest! {
    #[test]
    fn test_agrees_with_lexicographic_order(
        strategy in strategies(),
        (a, b) in buffer_pairs(),
        cut in 0usize..=128,
    ) {
        let n = cut.min(a.len());
        let expected = Verdict::from(a[..n].cmp(&b[..n]));
        prop_assert_eq!(strategy.compare(&a, &b, n), expected);
    }

    #[test]
    fn test_antisymmetry(strategy in strategies(), (a, b) in buffer_pairs()) {
        let n = a.len();
        prop_assert_eq!(strategy.compare(&a, &b, n), -strategy.compare(&b, &a, n));
    }

    #[test]
    fn test_reflexive_on_copies(
        strategy in strategies(),
        a in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let b = a.clone();
        prop_assert_eq!(strategy.compare(&a, &b, a.len()), Verdict::Equal);
        prop_assert_eq!(strategy.compare(&a, &a, a.len()), Verdict::Equal);
    }

    #[test]
    fn test_deterministic((a, b) in buffer_pairs()) {
        let n = a.len();
        let first = compare(Some(&a[..]), Some(&b[..]), n);
        for _ in 0..4 {
            prop_assert_eq!(compare(Some(&a[..]), Some(&b[..]), n), first);
        }
    }

    #[test]
    fn test_zero_length_and_absent(strategy in strategies(), (a, b) in buffer_pairs()) {
        prop_assert_eq!(strategy.compare(&a, &b, 0), Verdict::Equal);
        prop_assert_eq!(compare_with(&strategy, None, Some(&b[..]), b.len()), Verdict::Equal);
        prop_assert_eq!(compare_with(&strategy, Some(&a[..]), None, a.len()), Verdict::Equal);
    }

    #[test]
    fn test_strategies_agree((a, b) in buffer_pairs()) {
        let n = a.len();
        let reference = EarlyExit.compare(&a, &b, n);
        for strategy in CtStrategy::ALL {
            prop_assert_eq!(strategy.compare(&a, &b, n), reference, "{}", strategy);
        }
    }
}
