//! Canonical query and signature tests
//!
//! Fixed cases with rstest, algebraic laws with proptest.

use proptest::prelude::*;
use rstest::*;
use std::collections::HashMap;

use tradewire_core::Fixed;
use tradewire_exchanges::binance::{encode_component, sign, CanonicalQuery, ParamValue, ParameterMap};
use tradewire_tests::TEST_SECRET;

// ============================================================================
// FIXTURES
// ============================================================================

#[fixture]
fn market_order_params() -> ParameterMap {
    ParameterMap::new()
        .with("symbol", "BTCUSDT")
        .with("side", "BUY")
        .with("type", "MARKET")
        .with("quantity", Fixed::from_f64(0.001).unwrap())
        .with("timestamp", 1_700_000_000_000u64)
        .with("recvWindow", 5000u64)
}

// ============================================================================
// KNOWN ANSWERS
// ============================================================================

#[cfg(test)]
mod known_answers {
    use super::*;

    #[rstest]
    #[case(
        "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559",
        "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
    )]
    fn test_documented_signature(#[case] message: &str, #[case] expected: &str) {
        assert_eq!(sign(TEST_SECRET, message).unwrap(), expected);
    }

    #[rstest]
    fn test_market_order_scenario(market_order_params: ParameterMap) {
        let canonical = CanonicalQuery::build(&market_order_params);

        let keys: Vec<&str> = canonical.keys().collect();
        assert_eq!(keys, ["quantity", "recvWindow", "side", "symbol", "timestamp", "type"]);

        let first = sign(TEST_SECRET, canonical.as_str()).unwrap();
        let second = sign(TEST_SECRET, canonical.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case("BTCUSDT", "BTCUSDT")]
    #[case("a b", "a+b")]
    #[case("~-_.", "~-_.")]
    #[case("1+1=2", "1%2B1%3D2")]
    #[case("x&y", "x%26y")]
    #[case("ü", "%C3%BC")]
    #[case("50%", "50%25")]
    fn test_form_encoding(#[case] raw: &str, #[case] encoded: &str) {
        assert_eq!(encode_component(raw), encoded);
    }

    #[rstest]
    #[case(ParamValue::Bool(true), Some("true"))]
    #[case(ParamValue::Bool(false), Some("false"))]
    #[case(ParamValue::Int(-7), Some("-7"))]
    #[case(ParamValue::UInt(1_700_000_000_000), Some("1700000000000"))]
    #[case(ParamValue::Decimal(Fixed::from_str_exact("0.00000001").unwrap()), Some("0.00000001"))]
    #[case(ParamValue::Null, None)]
    fn test_wire_strings(#[case] value: ParamValue, #[case] expected: Option<&str>) {
        assert_eq!(value.to_wire_string().as_deref(), expected);
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[cfg(test)]
mod canonical_properties {
    use super::*;

    fn params_strategy() -> impl Strategy<Value = HashMap<String, String>> {
        proptest::collection::hash_map("[a-zA-Z]{1,10}", "[ -~]{0,16}", 0..12)
    }

    proptest! {
        #[test]
        fn test_insertion_order_irrelevant(entries in params_strategy()) {
            let mut ordered: Vec<_> = entries.into_iter().collect();
            ordered.sort();

            let forward: ParameterMap = ordered.iter().cloned().collect();
            let backward: ParameterMap = ordered.iter().rev().cloned().collect();

            prop_assert_eq!(CanonicalQuery::build(&forward), CanonicalQuery::build(&backward));
        }

        #[test]
        fn test_keys_sorted(entries in params_strategy()) {
            let params: ParameterMap = entries.into_iter().collect();
            let canonical = CanonicalQuery::build(&params);

            let keys: Vec<&str> = canonical.keys().collect();
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            prop_assert_eq!(keys, sorted);
        }

        #[test]
        fn test_absent_values_never_appear(
            present in proptest::collection::hash_map("p[a-z]{1,6}", "[a-z0-9]{1,8}", 0..6),
            absent in proptest::collection::hash_set("n[a-z]{1,6}", 0..6),
        ) {
            let mut params: ParameterMap = present.clone().into_iter().collect();
            for key in &absent {
                params.insert(key.clone(), ParamValue::Null);
            }

            let canonical = CanonicalQuery::build(&params);
            prop_assert_eq!(canonical.entries().len(), present.len());
            for key in &absent {
                let needle = format!("{key}=");
                prop_assert!(!canonical.as_str().split('&').any(|pair| pair.starts_with(&needle)));
            }
        }

        #[test]
        fn test_booleans_are_literals(flag in any::<bool>()) {
            let params = ParameterMap::new().with("reduceOnly", flag);
            let expected = if flag { "reduceOnly=true" } else { "reduceOnly=false" };
            let canonical = CanonicalQuery::build(&params);
            prop_assert_eq!(canonical.as_str(), expected);
        }

        #[test]
        fn test_encoded_alphabet(entries in params_strategy()) {
            let params: ParameterMap = entries.into_iter().collect();
            let canonical = CanonicalQuery::build(&params);

            let all_allowed = canonical.as_str().chars().all(|c| {
                c.is_ascii_alphanumeric() || "-_.~+%=&".contains(c)
            });
            prop_assert!(all_allowed);
        }

        #[test]
        fn test_single_char_change_alters_signature(
            message in "[ -~]{1,64}",
            index in any::<prop::sample::Index>(),
        ) {
            let position = index.index(message.len());
            let mut bytes = message.clone().into_bytes();
            bytes[position] = if bytes[position] == b'a' { b'b' } else { b'a' };
            let altered = String::from_utf8(bytes).unwrap();

            prop_assert_eq!(sign(TEST_SECRET, &message).unwrap(), sign(TEST_SECRET, &message).unwrap());
            prop_assert_ne!(sign(TEST_SECRET, &message).unwrap(), sign(TEST_SECRET, &altered).unwrap());
        }

        #[test]
        fn test_different_secret_different_signature(message in "[ -~]{0,64}") {
            prop_assert_ne!(sign("secret-a", &message).unwrap(), sign("secret-b", &message).unwrap());
        }
    }
}
