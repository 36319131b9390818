use std::cmp::Ordering;

use mpack::{decode, encode, validate, Value};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::from),
        any::<i8>().prop_map(Value::from),
        any::<i16>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u8>().prop_map(Value::from),
        any::<u16>().prop_map(Value::from),
        any::<u32>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f32>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        ".{0,40}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::from),
        (any::<i8>(), prop::collection::vec(any::<u8>(), 0..20)).prop_map(Value::from),
    ]
}

/// Numbers that sit on or next to each other across tags, where a lossy
/// comparison would get the order wrong.
fn close_number() -> impl Strategy<Value = Value> {
    const P53: u64 = 1 << 53;
    prop_oneof![
        (P53 - 1..=P53 + 2).prop_map(Value::from),
        (P53 - 1..=P53 + 2).prop_map(|n| Value::from(n as i64)),
        (P53 - 1..=P53 + 2).prop_map(|n| Value::from(n as f64)),
        (P53 - 1..=P53 + 2).prop_map(|n| Value::from(n as f32)),
        (-2i64..=2).prop_map(Value::from),
        (-2i8..=2).prop_map(|n| Value::from(n as f32 + 0.5)),
        prop::sample::select(vec![
            Value::from(0.0f64),
            Value::from(-0.0f64),
            Value::from(-0.0f32),
            Value::from(f64::NAN),
            Value::from(f32::NAN),
            Value::from(f64::INFINITY),
            Value::from(f32::NEG_INFINITY),
            Value::from(u64::MAX),
            Value::from(i64::MIN),
            Value::from(18_446_744_073_709_551_616.0f64),
        ]),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![3 => scalar(), 2 => close_number()].prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::from),
            prop::collection::vec((inner.clone(), inner), 0..8).prop_map(Value::object),
        ]
    })
}

/// Like `==`, but also requires matching float bit patterns for NaN.
fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float32(x), Value::Float32(y)) => x.to_bits() == y.to_bits(),
        (Value::Float64(x), Value::Float64(y)) => x.to_bits() == y.to_bits(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| same(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|((lk, lv), (rk, rv))| same(lk, rk) && same(lv, rv))
        }
        // The decoder picks integer tags from the wire width, so only the value counts.
        _ if a.is_int() && b.is_int() => a == b,
        _ => a.value_type() == b.value_type() && a == b,
    }
}

#[test]
fn neighbours_above_two_pow_53_stay_distinct() {
    let p = 1u64 << 53;
    assert!(Value::from(p) < Value::from(p + 1));
    assert!(Value::from(p as f64) < Value::from(p + 1));
    assert!(Value::from((p + 1) as i64) > Value::from(p as f32));
    assert_eq!(Value::from(p as f64), Value::from(p as i64));
    assert_eq!(Value::from(-0.0f32), Value::from(0u8));
}

proptest! {
    #[test]
    fn round_trip(v in value()) {
        let bytes = encode(&v).unwrap();
        let back = decode(&bytes).unwrap();
        prop_assert!(same(&back, &v), "{:?} became {:?}", v, back);
        prop_assert_eq!(validate(&bytes), Ok(bytes.len()));
        // Canonical: re-encoding the decoded value gives identical bytes.
        prop_assert_eq!(encode(&back).unwrap(), bytes);
    }

    #[test]
    fn strict_prefixes_never_decode(v in value(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&v).unwrap();
        let cut = cut.index(bytes.len());
        prop_assert!(decode(&bytes[..cut]).is_err());
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let decoded = decode(&bytes);
        let validated = validate(&bytes);
        prop_assert_eq!(decoded.is_ok(), validated.is_ok());
    }

    #[test]
    fn ordering_is_total(a in value(), b in value()) {
        let ab = a.cmp(&b);
        prop_assert_eq!(ab, b.cmp(&a).reverse());
        prop_assert_eq!(ab == Ordering::Equal, a == b);
        prop_assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn ordering_is_transitive(a in value(), b in value(), c in value()) {
        let triples = [
            (&a, &b, &c),
            (&a, &c, &b),
            (&b, &a, &c),
            (&b, &c, &a),
            (&c, &a, &b),
            (&c, &b, &a),
        ];
        for (x, y, z) in triples {
            if x < y && y < z {
                prop_assert!(x < z, "{:?} < {:?} < {:?}", x, y, z);
            }
            if x <= y && y <= z {
                prop_assert!(x <= z, "{:?} <= {:?} <= {:?}", x, y, z);
            }
            if x == y && y == z {
                prop_assert_eq!(x, z);
            }
        }
    }

    #[test]
    fn close_numbers_are_transitive(
        a in close_number(),
        b in close_number(),
        c in close_number(),
    ) {
        for (x, y, z) in [(&a, &b, &c), (&b, &c, &a), (&c, &a, &b)] {
            if x <= y && y <= z {
                prop_assert!(x <= z, "{:?} <= {:?} <= {:?}", x, y, z);
            }
            if x >= y && y >= z {
                prop_assert!(x >= z, "{:?} >= {:?} >= {:?}", x, y, z);
            }
        }
    }

    #[test]
    fn numbers_compare_by_value(x in any::<i32>(), y in any::<i32>()) {
        let expected = x.cmp(&y);
        prop_assert_eq!(Value::from(x as i64).cmp(&Value::from(y as f64)), expected);
        prop_assert_eq!(Value::from(x as f64).cmp(&Value::from(y)), expected);
        if x >= 0 {
            prop_assert_eq!(Value::from(x as u64).cmp(&Value::from(y as i64)), expected);
        }
    }
}
