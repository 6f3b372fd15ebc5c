//! Property-based tests for the naming transforms
//!
//! Every emitter derives identifiers from schema field names, so these
//! properties must hold for any lower snake case input.

use proptest::prelude::*;
use socketgen_core::naming::{is_identifier, lowercase_first, to_camel_case, to_pascal_case};

// Strategy: underscore-delimited lowercase identifiers (`login_req`, `v2_x__y`)
fn arb_snake_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}(_{1,2}[a-z0-9]{1,8}){0,4}"
}

// Strategy: arbitrary strings with underscores mixed in
fn arb_messy_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{0,24}"
}

proptest! {
    /// Property: PascalCase with the first letter lowered equals camelCase
    #[test]
    fn proptest_pascal_lowered_equals_camel(name in arb_snake_identifier()) {
        prop_assert_eq!(lowercase_first(&to_pascal_case(&name)), to_camel_case(&name));
    }

    /// Property: conversions drop every underscore
    #[test]
    fn proptest_no_underscores_survive(name in arb_messy_name()) {
        prop_assert!(!to_camel_case(&name).contains('_'));
        prop_assert!(!to_pascal_case(&name).contains('_'));
    }

    /// Property: conversions keep every non-underscore character, in order
    #[test]
    fn proptest_letters_preserved_case_insensitively(name in arb_messy_name()) {
        let expected: String = name.chars().filter(|c| *c != '_').collect::<String>().to_lowercase();

        prop_assert_eq!(to_camel_case(&name).to_lowercase(), expected.clone());
        prop_assert_eq!(to_pascal_case(&name).to_lowercase(), expected);
    }

    /// Property: a snake case identifier stays a valid identifier after conversion
    #[test]
    fn proptest_identifiers_stay_identifiers(name in arb_snake_identifier()) {
        prop_assert!(is_identifier(&to_camel_case(&name)));
        prop_assert!(is_identifier(&to_pascal_case(&name)));
    }

    /// Property: conversions are deterministic
    #[test]
    fn proptest_conversions_are_deterministic(name in arb_messy_name()) {
        prop_assert_eq!(to_camel_case(&name), to_camel_case(&name));
        prop_assert_eq!(to_pascal_case(&name), to_pascal_case(&name));
    }
}
