//! # Slug Module
//!
//! The shared normalization used by every trigger branch.
//!
//! The rule is fixed: lowercase, replace any run of characters outside
//! `[a-z0-9]` with a single underscore, strip leading and trailing
//! underscores. The same function serves campaign values, page paths, and
//! locale hints so their codes are comparable across events.

// =============================================================================
// SLUGIFY
// =============================================================================

/// Normalize a raw value into a slug.
///
/// Idempotent: `slugify(slugify(s)) == slugify(s)`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut gap = false;

    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if gap && !out.is_empty() {
                out.push('_');
            }
            gap = false;
            out.push(ch);
        } else {
            // Runs of separators collapse; leading runs never emit.
            gap = true;
        }
    }

    out
}

/// Normalize a manual override code: trim and lowercase, nothing more.
///
/// Override codes are operator-chosen and already slug-shaped; collapsing
/// their separators would change the code the dashboard filters on.
#[must_use]
pub fn normalize_code(input: &str) -> String {
    input.trim().to_lowercase()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slugify_lowercases_and_joins() {
        assert_eq!(slugify("Diwali_Sale"), "diwali_sale");
        assert_eq!(slugify("Summer Sale 2024"), "summer_sale_2024");
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("a--b__c  d"), "a_b_c_d");
        assert_eq!(slugify("/products/shoes"), "products_shoes");
    }

    #[test]
    fn slugify_strips_edges() {
        assert_eq!(slugify("__hello__"), "hello");
        assert_eq!(slugify("///"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("café-menu"), "caf_menu");
        assert_eq!(slugify("en-IN"), "en_in");
    }

    #[test]
    fn normalize_code_trims_and_lowercases() {
        assert_eq!(normalize_code("  VIP_Offer "), "vip_offer");
        assert_eq!(normalize_code("sales"), "sales");
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(input in ".{0,64}") {
            let once = slugify(&input);
            prop_assert_eq!(slugify(&once), once);
        }

        #[test]
        fn slugify_output_alphabet_is_closed(input in ".{0,64}") {
            let slug = slugify(&input);
            prop_assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!slug.starts_with('_'));
            prop_assert!(!slug.ends_with('_'));
        }
    }
}
