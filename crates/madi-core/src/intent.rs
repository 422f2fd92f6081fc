//! # Intent Module
//!
//! The fixed vocabulary of visitor intents and its synonym table.
//!
//! Free-form intent strings ("pricing", "book a demo") are normalized
//! through the shared slugifier and matched against a closed set of five
//! canonical intents. Anything outside the table yields no match, so the
//! resolver falls through to the next branch instead of inventing codes.

use crate::slug::slugify;
use serde::{Deserialize, Serialize};

// =============================================================================
// CANONICAL INTENTS
// =============================================================================

/// A canonical visitor intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SalesInquiry,
    SupportHelp,
    DemoBooking,
    QuoteRequest,
    WhatsappOptinConfirm,
}

impl Intent {
    /// All canonical intents in deterministic order.
    pub const ALL: [Intent; 5] = [
        Intent::SalesInquiry,
        Intent::SupportHelp,
        Intent::DemoBooking,
        Intent::QuoteRequest,
        Intent::WhatsappOptinConfirm,
    ];

    /// The canonical trigger code for this intent.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Intent::SalesInquiry => "sales_inquiry",
            Intent::SupportHelp => "support_help",
            Intent::DemoBooking => "demo_booking",
            Intent::QuoteRequest => "quote_request",
            Intent::WhatsappOptinConfirm => "whatsapp_optin_confirm",
        }
    }

    /// Match a raw intent string against the vocabulary.
    ///
    /// The input is slugified first, so "Book a Demo!" and "book_a_demo"
    /// are treated alike. Returns `None` for anything outside the table.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        let key = slugify(raw);
        if key.is_empty() {
            return None;
        }
        SYNONYMS
            .binary_search_by(|(synonym, _)| synonym.cmp(&key.as_str()))
            .ok()
            .and_then(|idx| SYNONYMS.get(idx))
            .map(|(_, intent)| *intent)
    }
}

// =============================================================================
// SYNONYM TABLE
// =============================================================================

/// Synonym -> canonical intent, sorted by synonym for binary search.
///
/// Every canonical code maps to itself so canonical input round-trips.
const SYNONYMS: &[(&str, Intent)] = &[
    ("book_a_demo", Intent::DemoBooking),
    ("booking", Intent::DemoBooking),
    ("buy", Intent::SalesInquiry),
    ("call", Intent::DemoBooking),
    ("confirm", Intent::WhatsappOptinConfirm),
    ("contact", Intent::SupportHelp),
    ("demo", Intent::DemoBooking),
    ("demo_booking", Intent::DemoBooking),
    ("estimate", Intent::QuoteRequest),
    ("help", Intent::SupportHelp),
    ("opt_in", Intent::WhatsappOptinConfirm),
    ("optin", Intent::WhatsappOptinConfirm),
    ("price", Intent::SalesInquiry),
    ("pricing", Intent::SalesInquiry),
    ("quote", Intent::QuoteRequest),
    ("quote_request", Intent::QuoteRequest),
    ("sales", Intent::SalesInquiry),
    ("sales_inquiry", Intent::SalesInquiry),
    ("schedule", Intent::DemoBooking),
    ("subscribe", Intent::WhatsappOptinConfirm),
    ("support", Intent::SupportHelp),
    ("support_help", Intent::SupportHelp),
    ("whatsapp_optin_confirm", Intent::WhatsappOptinConfirm),
];

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_table_is_sorted() {
        // binary_search depends on this
        for window in SYNONYMS.windows(2) {
            assert!(window[0].0 < window[1].0, "{} >= {}", window[0].0, window[1].0);
        }
    }

    #[test]
    fn canonical_codes_round_trip() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_raw(intent.code()), Some(intent));
        }
    }

    #[test]
    fn known_synonyms_match() {
        assert_eq!(Intent::from_raw("pricing"), Some(Intent::SalesInquiry));
        assert_eq!(Intent::from_raw("demo"), Some(Intent::DemoBooking));
        assert_eq!(Intent::from_raw("help"), Some(Intent::SupportHelp));
        assert_eq!(Intent::from_raw("quote"), Some(Intent::QuoteRequest));
        assert_eq!(
            Intent::from_raw("optin"),
            Some(Intent::WhatsappOptinConfirm)
        );
    }

    #[test]
    fn matching_is_slug_insensitive() {
        assert_eq!(Intent::from_raw("  Pricing "), Some(Intent::SalesInquiry));
        assert_eq!(Intent::from_raw("Opt-In"), Some(Intent::WhatsappOptinConfirm));
        assert_eq!(Intent::from_raw("Book a Demo!"), Some(Intent::DemoBooking));
    }

    #[test]
    fn unknown_intent_yields_none() {
        assert_eq!(Intent::from_raw("weather"), None);
        assert_eq!(Intent::from_raw(""), None);
        assert_eq!(Intent::from_raw("   "), None);
    }
}
