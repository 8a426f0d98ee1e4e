#![no_main]
use ct_memcmp::{Comparator, Strategy, Verdict};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() >= 2 {
        let mid = data.len() / 2;
        let (lhs, rhs) = data.split_at(mid);
        let n = lhs.len().min(rhs.len());
        let expected = Verdict::from(lhs[..n].cmp(&rhs[..n]));
        for strategy in Strategy::ALL {
            assert_eq!(strategy.compare(lhs, rhs, n), expected, "{}", strategy);
        }
        let raw = unsafe { ct_memcmp::ct_memcmp(lhs.as_ptr(), rhs.as_ptr(), n) };
        assert_eq!(raw, expected.as_i32());
    }
});
