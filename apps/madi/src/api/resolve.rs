//! Resolution endpoint: `GET /resolve` and `POST /resolve`.
//!
//! The GET form reads everything from the query string. The POST form
//! layers a JSON body over the query-string defaults: body fields win on
//! conflict, and the `utm` sub-object is shallow-merged key-by-key.
//! When the request carries no explicit referrer the `Referer` header is
//! used, and an absent `seen` parameter falls back to the visitor cookie.

use axum::extract::Query;
use axum::http::{header, HeaderMap};
use axum::response::Json;
use madi_core::{resolve, TriggerContext, TriggerResolution, UtmBundle};
use serde::{Deserialize, Serialize};

/// Cookie the widget script sets once a visitor has been greeted.
pub(crate) const SEEN_COOKIE: &str = "madi_seen";

// =============================================================================
// REQUEST / RESPONSE SHAPES
// =============================================================================

/// A boolean that arrives as `1`/`true`/`yes` in query strings or as a
/// JSON boolean in bodies.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(u64),
    Text(String),
}

impl Flag {
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Int(value) => *value != 0,
            Flag::Text(value) => {
                matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "y"
                )
            }
        }
    }
}

/// Flat resolution parameters, shared by the query string and the JSON
/// body. `widget_id`/`business_id` ride along for the widget surface.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveParams {
    pub url: Option<String>,
    pub pathname: Option<String>,
    pub referrer: Option<String>,
    pub locale: Option<String>,
    pub seen: Option<Flag>,
    /// Manual trigger override.
    pub trigger: Option<String>,
    pub intent: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub widget_id: Option<String>,
    pub business_id: Option<String>,
}

impl ResolveParams {
    /// Build a resolver context from the flat fields.
    #[must_use]
    pub fn to_context(&self) -> TriggerContext {
        TriggerContext {
            url: self.url.clone(),
            pathname: self.pathname.clone(),
            referrer: self.referrer.clone(),
            locale: self.locale.clone(),
            seen: self.seen.as_ref().map(Flag::truthy),
            manual_override: self.trigger.clone(),
            intent: self.intent.clone(),
            utm: UtmBundle {
                campaign: self.utm_campaign.clone(),
                source: self.utm_source.clone(),
                medium: self.utm_medium.clone(),
                term: self.utm_term.clone(),
                content: self.utm_content.clone(),
            },
        }
    }
}

/// POST body: the flat fields plus an optional nested `utm` object.
/// Nested keys win over their flat `utm_*` counterparts.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveBody {
    #[serde(flatten)]
    pub flat: ResolveParams,
    pub utm: Option<UtmBundle>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub ok: bool,
    /// The context as the resolver saw it, echoed for debugging embeds.
    pub ctx: TriggerContext,
    pub resolution: TriggerResolution,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// GET /resolve
pub async fn get_resolve(
    headers: HeaderMap,
    Query(params): Query<ResolveParams>,
) -> Json<ResolveResponse> {
    let mut ctx = params.to_context();
    apply_header_fallbacks(&mut ctx, &headers);
    respond(ctx)
}

/// POST /resolve
pub async fn post_resolve(
    headers: HeaderMap,
    Query(query): Query<ResolveParams>,
    body: Option<Json<ResolveBody>>,
) -> Json<ResolveResponse> {
    let base = query.to_context();
    let mut ctx = match body {
        Some(Json(body)) => {
            let mut patch = body.flat.to_context();
            if let Some(utm) = &body.utm {
                patch.utm = UtmBundle::overlay(&patch.utm, utm);
            }
            TriggerContext::overlay(&base, &patch)
        }
        None => base,
    };
    apply_header_fallbacks(&mut ctx, &headers);
    respond(ctx)
}

fn respond(ctx: TriggerContext) -> Json<ResolveResponse> {
    let resolution = resolve(&ctx);
    Json(ResolveResponse {
        ok: true,
        ctx,
        resolution,
    })
}

// =============================================================================
// HEADER FALLBACKS
// =============================================================================

pub(crate) fn apply_header_fallbacks(ctx: &mut TriggerContext, headers: &HeaderMap) {
    if ctx.referrer.is_none() {
        ctx.referrer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
    }
    if ctx.seen.is_none() {
        ctx.seen = cookie_flag(headers, SEEN_COOKIE);
    }
}

/// Read a boolean cookie from the `Cookie` header.
fn cookie_flag(headers: &HeaderMap, name: &str) -> Option<bool> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some(name) {
            let value = parts.next().unwrap_or("");
            return Some(matches!(value.trim(), "1" | "true" | "yes"));
        }
    }
    None
}

// =============================================================================
// TESTS
// =============================================================================
