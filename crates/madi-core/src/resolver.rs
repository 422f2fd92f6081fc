//! # Resolver Module
//!
//! The priority cascade that picks one trigger per visitor.
//!
//! The cascade is an ordered list of independent rules evaluated in
//! sequence; the first rule that produces a resolution wins and later
//! branches are never consulted. The lifecycle branch is the unconditional
//! fallback, which makes `resolve` total: every context resolves, no
//! context errors.

use crate::context::{non_blank, TriggerContext};
use crate::intent::Intent;
use crate::resolution::{
    TriggerResolution, TriggerType, CODE_FIRST_VISIT, CODE_GEO_LOCALE, CODE_PAGE_CONTEXT,
    CODE_RETURNING_VISIT, CODE_UTM_CAMPAIGN,
};
use crate::slug::{normalize_code, slugify};

// =============================================================================
// CASCADE
// =============================================================================

type Rule = fn(&TriggerContext) -> Option<TriggerResolution>;

/// Priority order, highest first. Manual overrides beat campaign
/// attribution, attribution beats declared intent, and so on down to the
/// lifecycle fallback.
const CASCADE: &[Rule] = &[
    manual_override,
    utm_campaign,
    declared_intent,
    page_context,
    geo_locale,
];

/// Resolve a context to exactly one trigger.
///
/// Total and pure: no side effects, no error states. Blank or malformed
/// values fall through to the next branch.
#[must_use]
pub fn resolve(ctx: &TriggerContext) -> TriggerResolution {
    for rule in CASCADE {
        if let Some(resolution) = rule(ctx) {
            return resolution;
        }
    }
    lifecycle(ctx)
}

// =============================================================================
// BRANCHES
// =============================================================================

/// 1. Explicit override set by the embedding page wins over everything.
fn manual_override(ctx: &TriggerContext) -> Option<TriggerResolution> {
    let raw = non_blank(&ctx.manual_override)?;
    let code = normalize_code(raw);
    if code.is_empty() {
        return None;
    }
    let why = format!("manual:{code}");
    Some(TriggerResolution::new(code, TriggerType::Manual, why))
}

/// 2. Campaign attribution.
fn utm_campaign(ctx: &TriggerContext) -> Option<TriggerResolution> {
    let raw = non_blank(&ctx.utm.campaign)?;
    let slug = slugify(raw);
    if slug.is_empty() {
        return None;
    }
    Some(TriggerResolution::new(
        CODE_UTM_CAMPAIGN,
        TriggerType::Campaign,
        format!("utm_campaign:{slug}"),
    ))
}

/// 3. Declared intent, matched against the fixed vocabulary.
///    Unrecognized intents fall through rather than producing a code.
fn declared_intent(ctx: &TriggerContext) -> Option<TriggerResolution> {
    let raw = non_blank(&ctx.intent)?;
    let intent = Intent::from_raw(raw)?;
    Some(TriggerResolution::new(
        intent.code(),
        TriggerType::Intent,
        format!("intent:{}", intent.code()),
    ))
}

/// 4. Page context. The root path carries no context.
fn page_context(ctx: &TriggerContext) -> Option<TriggerResolution> {
    let path = ctx.effective_path()?;
    let slug = slugify(&path);
    if slug.is_empty() {
        return None;
    }
    Some(TriggerResolution::new(
        CODE_PAGE_CONTEXT,
        TriggerType::Context,
        format!("page_context:{slug}"),
    ))
}

/// 5. Locale hint.
fn geo_locale(ctx: &TriggerContext) -> Option<TriggerResolution> {
    let raw = non_blank(&ctx.locale)?;
    let slug = slugify(raw);
    if slug.is_empty() {
        return None;
    }
    Some(TriggerResolution::new(
        CODE_GEO_LOCALE,
        TriggerType::Locale,
        format!("locale:{slug}"),
    ))
}

/// 6. Lifecycle fallback, unconditional.
fn lifecycle(ctx: &TriggerContext) -> TriggerResolution {
    let code = if ctx.seen_flag() {
        CODE_RETURNING_VISIT
    } else {
        CODE_FIRST_VISIT
    };
    TriggerResolution::new(code, TriggerType::Lifecycle, format!("lifecycle:{code}"))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UtmBundle;

    fn ctx() -> TriggerContext {
        TriggerContext::default()
    }

    #[test]
    fn manual_override_always_wins() {
        let context = TriggerContext {
            manual_override: Some("  VIP_Offer ".to_string()),
            intent: Some("pricing".to_string()),
            pathname: Some("/products".to_string()),
            locale: Some("en-IN".to_string()),
            utm: UtmBundle {
                campaign: Some("diwali".to_string()),
                ..UtmBundle::default()
            },
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Manual);
        assert_eq!(resolution.code, "vip_offer");
        assert_eq!(resolution.why, "manual:vip_offer");
    }

    #[test]
    fn campaign_beats_intent() {
        let context = TriggerContext {
            intent: Some("pricing".to_string()),
            utm: UtmBundle {
                campaign: Some("Diwali_Sale".to_string()),
                ..UtmBundle::default()
            },
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Campaign);
        assert_eq!(resolution.code, CODE_UTM_CAMPAIGN);
        assert_eq!(resolution.why, "utm_campaign:diwali_sale");
    }

    #[test]
    fn campaign_ignores_lower_priority_path() {
        let context = TriggerContext {
            pathname: Some("/pricing".to_string()),
            utm: UtmBundle {
                campaign: Some("Diwali_Sale".to_string()),
                ..UtmBundle::default()
            },
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.code, "utm_campaign");
        assert_eq!(resolution.kind, TriggerType::Campaign);
        assert_eq!(resolution.why, "utm_campaign:diwali_sale");
    }

    #[test]
    fn recognized_intent_resolves_canonical_code() {
        let context = TriggerContext {
            intent: Some("Book a Demo!".to_string()),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Intent);
        assert_eq!(resolution.code, "demo_booking");
        assert_eq!(resolution.why, "intent:demo_booking");
    }

    #[test]
    fn unrecognized_intent_falls_through_to_page() {
        let context = TriggerContext {
            intent: Some("weather".to_string()),
            pathname: Some("/products/shoes".to_string()),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Context);
        assert_eq!(resolution.why, "page_context:products_shoes");
    }

    #[test]
    fn page_path_slug_appears_in_why() {
        let context = TriggerContext {
            pathname: Some("/products/shoes".to_string()),
            seen: Some(false),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.code, CODE_PAGE_CONTEXT);
        assert_eq!(resolution.kind, TriggerType::Context);
        assert_eq!(resolution.why, "page_context:products_shoes");
    }

    #[test]
    fn root_path_never_triggers_page_context() {
        for root in ["/", "", "  "] {
            let context = TriggerContext {
                pathname: Some(root.to_string()),
                ..ctx()
            };
            let resolution = resolve(&context);
            assert_eq!(resolution.kind, TriggerType::Lifecycle, "path {root:?}");
        }
    }

    #[test]
    fn path_from_url_drives_page_context() {
        let context = TriggerContext {
            url: Some("https://shop.example/pricing?utm_source=x".to_string()),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Context);
        assert_eq!(resolution.why, "page_context:pricing");
    }

    #[test]
    fn locale_resolves_when_nothing_above_matches() {
        let context = TriggerContext {
            locale: Some("en-IN".to_string()),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.code, CODE_GEO_LOCALE);
        assert_eq!(resolution.kind, TriggerType::Locale);
        assert_eq!(resolution.why, "locale:en_in");
    }

    #[test]
    fn lifecycle_fallback_is_total() {
        let resolution = resolve(&ctx());
        assert_eq!(resolution.code, CODE_FIRST_VISIT);
        assert_eq!(resolution.kind, TriggerType::Lifecycle);
        assert_eq!(resolution.why, "lifecycle:first_visit");
    }

    #[test]
    fn seen_visitor_resolves_returning() {
        let context = TriggerContext {
            seen: Some(true),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.code, CODE_RETURNING_VISIT);
        assert_eq!(resolution.kind, TriggerType::Lifecycle);
        assert_eq!(resolution.why, "lifecycle:returning_visit");
    }

    #[test]
    fn blank_override_falls_through() {
        let context = TriggerContext {
            manual_override: Some("   ".to_string()),
            locale: Some("en".to_string()),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Locale);
    }

    #[test]
    fn campaign_slugifying_to_empty_falls_through() {
        let context = TriggerContext {
            utm: UtmBundle {
                campaign: Some("!!!".to_string()),
                ..UtmBundle::default()
            },
            seen: Some(true),
            ..ctx()
        };

        let resolution = resolve(&context);
        assert_eq!(resolution.kind, TriggerType::Lifecycle);
        assert_eq!(resolution.code, CODE_RETURNING_VISIT);
    }
}
