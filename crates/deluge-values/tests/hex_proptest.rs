use deluge_values::{HexScale, StepRule, HEX_U50, PAN, SIGNED_50};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decode_of_any_raw_stays_in_range(raw in any::<u32>()) {
        let text = format!("0x{raw:08X}");
        for scale in [HEX_U50, SIGNED_50, PAN] {
            let v = scale.decode(&text).expect("any 32-bit hex decodes");
            prop_assert!(v >= scale.min && v <= scale.max);
        }
    }

    #[test]
    fn custom_scales_keep_extremes(
        min in -1000i32..0,
        width in 1i32..1000,
        power in any::<bool>(),
    ) {
        let step = if power { StepRule::PowerOfTwo } else { StepRule::Truncated };
        let scale = HexScale::new(min, min + width, step);
        prop_assert_eq!(scale.encode(min as i64).expect("min"), "0x80000000");
        prop_assert_eq!(scale.encode((min + width) as i64).expect("max"), "0x7FFFFFFF");
        prop_assert_eq!(scale.decode("0x80000000").expect("min"), min);
        prop_assert_eq!(scale.decode("0x7FFFFFFF").expect("max"), min + width);
    }
}
