//! Analytics endpoints: `POST /events` and `GET /events`.
//!
//! Recording requires a resolvable tenant: an explicit `business_id`, a
//! registered `widget_id`, or the server's configured default. Absence of
//! all three is a client error, never a silent drop.

use super::error::ApiError;
use super::{unix_millis, AppState};
use axum::extract::{Query, State};
use axum::response::Json;
use madi_core::context::non_blank;
use madi_core::{EventDraft, EventRecord, TriggerType};
use serde::{Deserialize, Serialize};

// =============================================================================
// REQUEST / RESPONSE SHAPES
// =============================================================================

/// Event fields, accepted via query string or JSON body (body wins).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EventParams {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub why: Option<String>,
    pub page: Option<String>,
    pub locale: Option<String>,
    pub widget_id: Option<String>,
    pub business_id: Option<String>,
}

impl EventParams {
    /// Field-by-field merge, `patch` wins when present.
    #[must_use]
    fn overlay(base: &Self, patch: &Self) -> Self {
        fn pick(base: &Option<String>, patch: &Option<String>) -> Option<String> {
            patch.clone().or_else(|| base.clone())
        }
        Self {
            code: pick(&base.code, &patch.code),
            kind: pick(&base.kind, &patch.kind),
            why: pick(&base.why, &patch.why),
            page: pick(&base.page, &patch.page),
            locale: pick(&base.locale, &patch.locale),
            widget_id: pick(&base.widget_id, &patch.widget_id),
            business_id: pick(&base.business_id, &patch.business_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventCreatedResponse {
    pub ok: bool,
    pub id: u64,
    pub created_at: u64,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub ok: bool,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub limit: Option<usize>,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// POST /events
pub async fn record_event(
    State(state): State<AppState>,
    Query(query): Query<EventParams>,
    body: Option<Json<EventParams>>,
) -> Result<Json<EventCreatedResponse>, ApiError> {
    let params = match body {
        Some(Json(body)) => EventParams::overlay(&query, &body),
        None => query,
    };

    let business_id = resolve_business(&state, &params)?;
    let code = non_blank(&params.code)
        .ok_or(ApiError::MissingField("code"))?
        .to_string();
    let kind: TriggerType = non_blank(&params.kind)
        .ok_or(ApiError::MissingField("type"))?
        .parse()?;

    let draft = EventDraft {
        code,
        kind,
        why: params.why.clone(),
        page: params.page.clone(),
        locale: params.locale.clone(),
        widget_id: params.widget_id.clone(),
        business_id,
    };

    let record = state.store.append(&draft, unix_millis())?;
    tracing::info!(
        id = record.id.0,
        code = %record.code,
        business = %record.business_id,
        "analytics event recorded"
    );

    Ok(Json(EventCreatedResponse {
        ok: true,
        id: record.id.0,
        created_at: record.created_at_ms,
    }))
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = state.store.recent(params.limit.unwrap_or(50))?;
    Ok(Json(EventListResponse { ok: true, events }))
}

// =============================================================================
// TENANT RESOLUTION
// =============================================================================

/// Pick the business an event belongs to: explicit id, then widget
/// registry, then the configured default.
pub(crate) fn resolve_business(
    state: &AppState,
    params: &EventParams,
) -> Result<String, ApiError> {
    if let Some(business) = non_blank(&params.business_id) {
        return Ok(business.to_string());
    }

    if let Some(widget) = non_blank(&params.widget_id) {
        if let Some(business) = state.store.business_for_widget(widget)? {
            return Ok(business);
        }
    }

    state
        .default_business
        .clone()
        .ok_or(ApiError::MissingBusiness)
}
