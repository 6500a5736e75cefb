//! Proptest generators for property-based testing.

use proptest::prelude::*;

use bakery::{Condition, Operator};

/// Generate an operator.
pub fn operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(Operator::ALL.to_vec())
}

/// Generate a condition key.
pub fn key() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,15}".prop_map(String::from)
}

/// Generate a condition value: printable ASCII, not starting with a space.
pub fn value() -> impl Strategy<Value = String> {
    "[!-~][ -~]{0,31}".prop_map(String::from)
}

/// Generate a valid condition.
pub fn condition() -> impl Strategy<Value = Condition> {
    (key(), operator(), value()).prop_map(|(key, op, value)| {
        Condition::new(key, op, value).expect("generated condition is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_generated_conditions_reparse(c in condition()) {
            prop_assert_eq!(Condition::parse(&c.to_string()).unwrap(), c);
        }

        #[test]
        fn prop_equal_condition_satisfied_by_own_value(k in key(), v in value()) {
            let c = Condition::equal(k, v.clone()).unwrap();
            prop_assert!(c.is_satisfied_by(&v));
        }
    }
}
