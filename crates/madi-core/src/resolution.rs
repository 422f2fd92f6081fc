//! # Resolution Module
//!
//! The output value of the trigger resolver.
//!
//! A resolution is immutable and returned exactly once per context; the
//! resolver itself never stores it. Persisting a copy is the analytics
//! pipeline's job.

use serde::{Deserialize, Serialize};

// =============================================================================
// TRIGGER CODES
// =============================================================================

/// Code emitted by the campaign branch.
pub const CODE_UTM_CAMPAIGN: &str = "utm_campaign";
/// Code emitted by the page-context branch.
pub const CODE_PAGE_CONTEXT: &str = "page_context";
/// Code emitted by the locale branch.
pub const CODE_GEO_LOCALE: &str = "geo_locale";
/// Lifecycle code for a first-time visitor.
pub const CODE_FIRST_VISIT: &str = "first_visit";
/// Lifecycle code for a returning visitor.
pub const CODE_RETURNING_VISIT: &str = "returning_visit";

// =============================================================================
// TRIGGER TYPE
// =============================================================================

/// Coarse category of a resolution, one per cascade branch.
///
/// Defaults to `Lifecycle`, the category of the unconditional fallback.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Manual,
    Campaign,
    Intent,
    Context,
    Locale,
    #[default]
    Lifecycle,
}

impl TriggerType {
    /// Wire name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerType::Manual => "manual",
            TriggerType::Campaign => "campaign",
            TriggerType::Intent => "intent",
            TriggerType::Context => "context",
            TriggerType::Locale => "locale",
            TriggerType::Lifecycle => "lifecycle",
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = UnknownTriggerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(TriggerType::Manual),
            "campaign" => Ok(TriggerType::Campaign),
            "intent" => Ok(TriggerType::Intent),
            "context" => Ok(TriggerType::Context),
            "locale" => Ok(TriggerType::Locale),
            "lifecycle" => Ok(TriggerType::Lifecycle),
            other => Err(UnknownTriggerType(other.to_string())),
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`TriggerType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized trigger type: {0}")]
pub struct UnknownTriggerType(pub String);

// =============================================================================
// TRIGGER RESOLUTION
// =============================================================================

/// Why the widget should show a message to this visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResolution {
    /// Specific trigger identifier.
    pub code: String,
    /// Coarse category.
    #[serde(rename = "type")]
    pub kind: TriggerType,
    /// Human-readable provenance, `"<branch>:<value>"`.
    pub why: String,
}

impl TriggerResolution {
    /// Create a resolution.
    #[must_use]
    pub fn new(code: impl Into<String>, kind: TriggerType, why: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind,
            why: why.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_type_round_trips_through_str() {
        let all = [
            TriggerType::Manual,
            TriggerType::Campaign,
            TriggerType::Intent,
            TriggerType::Context,
            TriggerType::Locale,
            TriggerType::Lifecycle,
        ];
        for kind in all {
            assert_eq!(kind.as_str().parse::<TriggerType>(), Ok(kind));
        }
    }

    #[test]
    fn trigger_type_parse_is_case_insensitive() {
        assert_eq!("  Campaign ".parse::<TriggerType>(), Ok(TriggerType::Campaign));
    }

    #[test]
    fn trigger_type_parse_rejects_unknown() {
        assert!("broadcast".parse::<TriggerType>().is_err());
    }

    #[test]
    fn resolution_serializes_kind_as_type() {
        let resolution =
            TriggerResolution::new(CODE_FIRST_VISIT, TriggerType::Lifecycle, "lifecycle:first_visit");
        let json = serde_json::to_value(&resolution).map_err(|e| e.to_string());
        assert_eq!(
            json,
            Ok(serde_json::json!({
                "code": "first_visit",
                "type": "lifecycle",
                "why": "lifecycle:first_visit",
            }))
        );
    }
}
