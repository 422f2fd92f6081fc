//! # Context Module
//!
//! Per-request input to the trigger resolver.
//!
//! A `TriggerContext` is assembled fresh for every resolution call from
//! whatever the caller knows about the visitor. Every field is optional;
//! the resolver treats blank strings the same as absent values.

use serde::{Deserialize, Serialize};

// =============================================================================
// UTM BUNDLE
// =============================================================================

/// Standard marketing attribution tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtmBundle {
    pub campaign: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
}

impl UtmBundle {
    /// True when no tag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.campaign.is_none()
            && self.source.is_none()
            && self.medium.is_none()
            && self.term.is_none()
            && self.content.is_none()
    }

    /// Shallow merge: each key of `patch` wins when present.
    #[must_use]
    pub fn overlay(base: &Self, patch: &Self) -> Self {
        Self {
            campaign: pick(&base.campaign, &patch.campaign),
            source: pick(&base.source, &patch.source),
            medium: pick(&base.medium, &patch.medium),
            term: pick(&base.term, &patch.term),
            content: pick(&base.content, &patch.content),
        }
    }
}

// =============================================================================
// TRIGGER CONTEXT
// =============================================================================

/// Everything known about one visitor at resolution time.
///
/// Ephemeral: constructed per request, never stored by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerContext {
    /// Full page URL, when the widget captured one.
    pub url: Option<String>,
    /// Page path; preferred over the path extracted from `url`.
    pub pathname: Option<String>,
    /// Document referrer (parameter or `Referer` header).
    pub referrer: Option<String>,
    /// Locale hint, e.g. `en-IN`.
    pub locale: Option<String>,
    /// Visitor seen before (client cookie). `None` means unknown.
    pub seen: Option<bool>,
    /// Explicit trigger override set by the embedding page.
    pub manual_override: Option<String>,
    /// Free-form declared intent.
    pub intent: Option<String>,
    /// UTM attribution tags.
    pub utm: UtmBundle,
}

impl TriggerContext {
    /// Merge two contexts: each field of `patch` wins when present.
    /// The UTM bundle is shallow-merged key-by-key.
    #[must_use]
    pub fn overlay(base: &Self, patch: &Self) -> Self {
        Self {
            url: pick(&base.url, &patch.url),
            pathname: pick(&base.pathname, &patch.pathname),
            referrer: pick(&base.referrer, &patch.referrer),
            locale: pick(&base.locale, &patch.locale),
            seen: patch.seen.or(base.seen),
            manual_override: pick(&base.manual_override, &patch.manual_override),
            intent: pick(&base.intent, &patch.intent),
            utm: UtmBundle::overlay(&base.utm, &patch.utm),
        }
    }

    /// The path the visitor is on: explicit `pathname` when given,
    /// otherwise the path component of `url`.
    #[must_use]
    pub fn effective_path(&self) -> Option<String> {
        if let Some(path) = non_blank(&self.pathname) {
            return Some(path.to_string());
        }
        non_blank(&self.url).and_then(path_from_url)
    }

    /// Lifecycle flag with the unknown state collapsed to "not seen".
    #[must_use]
    pub fn seen_flag(&self) -> bool {
        self.seen.unwrap_or(false)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// A present, non-whitespace value, trimmed.
#[must_use]
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

fn pick(base: &Option<String>, patch: &Option<String>) -> Option<String> {
    patch.clone().or_else(|| base.clone())
}

/// Extract the path component of a URL string.
///
/// Accepts absolute URLs (`https://host/path?q`) and bare paths (`/path`).
/// Malformed input yields `None`, never an error.
fn path_from_url(url: &str) -> Option<String> {
    let rest = match url.find("://") {
        Some(idx) => url.get(idx.saturating_add(3)..)?,
        None => {
            // No scheme: only a bare path is usable.
            if url.starts_with('/') {
                return trimmed_path(url);
            }
            return None;
        }
    };

    match rest.find('/') {
        Some(idx) => trimmed_path(rest.get(idx..)?),
        // Host without a path resolves to the root.
        None => None,
    }
}

fn trimmed_path(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_url(url: &str) -> TriggerContext {
        TriggerContext {
            url: Some(url.to_string()),
            ..TriggerContext::default()
        }
    }

    #[test]
    fn pathname_preferred_over_url() {
        let ctx = TriggerContext {
            url: Some("https://shop.example/checkout".to_string()),
            pathname: Some("/pricing".to_string()),
            ..TriggerContext::default()
        };
        assert_eq!(ctx.effective_path(), Some("/pricing".to_string()));
    }

    #[test]
    fn path_extracted_from_url() {
        let ctx = ctx_with_url("https://shop.example/products/shoes?utm_source=x");
        assert_eq!(ctx.effective_path(), Some("/products/shoes".to_string()));
    }

    #[test]
    fn bare_path_url_is_accepted() {
        let ctx = ctx_with_url("/pricing#plans");
        assert_eq!(ctx.effective_path(), Some("/pricing".to_string()));
    }

    #[test]
    fn host_only_url_has_no_path() {
        let ctx = ctx_with_url("https://shop.example");
        assert_eq!(ctx.effective_path(), None);
    }

    #[test]
    fn malformed_url_is_treated_as_empty() {
        assert_eq!(ctx_with_url("not a url").effective_path(), None);
        assert_eq!(ctx_with_url("://nohost").effective_path(), None);
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let ctx = TriggerContext {
            pathname: Some("   ".to_string()),
            ..TriggerContext::default()
        };
        assert_eq!(ctx.effective_path(), None);
        assert_eq!(non_blank(&Some(" x ".to_string())), Some("x"));
        assert_eq!(non_blank(&None), None);
    }

    #[test]
    fn overlay_patch_wins_per_field() {
        let base = TriggerContext {
            pathname: Some("/a".to_string()),
            locale: Some("en".to_string()),
            seen: Some(false),
            ..TriggerContext::default()
        };
        let patch = TriggerContext {
            pathname: Some("/b".to_string()),
            seen: Some(true),
            ..TriggerContext::default()
        };

        let merged = TriggerContext::overlay(&base, &patch);
        assert_eq!(merged.pathname, Some("/b".to_string()));
        assert_eq!(merged.locale, Some("en".to_string()));
        assert_eq!(merged.seen, Some(true));
    }

    #[test]
    fn utm_shallow_merge_is_key_by_key() {
        let base = UtmBundle {
            campaign: Some("diwali".to_string()),
            source: Some("google".to_string()),
            ..UtmBundle::default()
        };
        let patch = UtmBundle {
            source: Some("meta".to_string()),
            medium: Some("cpc".to_string()),
            ..UtmBundle::default()
        };

        let merged = UtmBundle::overlay(&base, &patch);
        assert_eq!(merged.campaign, Some("diwali".to_string()));
        assert_eq!(merged.source, Some("meta".to_string()));
        assert_eq!(merged.medium, Some("cpc".to_string()));
        assert_eq!(merged.term, None);
    }

    #[test]
    fn seen_flag_defaults_to_false() {
        assert!(!TriggerContext::default().seen_flag());
        let seen = TriggerContext {
            seen: Some(true),
            ..TriggerContext::default()
        };
        assert!(seen.seen_flag());
    }
}
