//! Widget script delivery: `GET /widget.js`.
//!
//! The embeddable script is the product's hot path: it must arrive fast
//! on every page view of every customer site. The trigger is resolved
//! inline, but the analytics insert is fire-and-forget — the response
//! never waits on the store, and insert failures are logged and
//! swallowed rather than surfaced to the visitor.

use super::events::{resolve_business, EventParams};
use super::resolve::{apply_header_fallbacks, ResolveParams, SEEN_COOKIE};
use super::{unix_millis, AppState};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use madi_core::{resolve, EventDraft, TriggerResolution};

// =============================================================================
// HANDLER
// =============================================================================

/// GET /widget.js
pub async fn widget_script(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ResolveParams>,
) -> impl IntoResponse {
    let mut ctx = params.to_context();
    apply_header_fallbacks(&mut ctx, &headers);
    let resolution = resolve(&ctx);

    // Best-effort analytics; the script response does not wait for this.
    spawn_event_insert(&state, &params, &ctx.effective_path(), &resolution);

    let script = render_script(&resolution);
    (
        [
            (
                header::CONTENT_TYPE,
                "application/javascript; charset=utf-8",
            ),
            (header::CACHE_CONTROL, "no-store"),
        ],
        script,
    )
}

// =============================================================================
// FIRE-AND-FORGET ANALYTICS
// =============================================================================

fn spawn_event_insert(
    state: &AppState,
    params: &ResolveParams,
    page: &Option<String>,
    resolution: &TriggerResolution,
) {
    let state = state.clone();
    let params = EventParams {
        code: Some(resolution.code.clone()),
        kind: Some(resolution.kind.as_str().to_string()),
        why: Some(resolution.why.clone()),
        page: page.clone(),
        locale: params.locale.clone(),
        widget_id: params.widget_id.clone(),
        business_id: params.business_id.clone(),
    };

    tokio::spawn(async move {
        let business_id = match resolve_business(&state, &params) {
            Ok(business_id) => business_id,
            Err(err) => {
                tracing::debug!(error = %err, "widget event not attributable, skipping");
                return;
            }
        };

        let draft = EventDraft {
            code: params.code.clone().unwrap_or_default(),
            kind: params
                .kind
                .as_deref()
                .and_then(|kind| kind.parse().ok())
                .unwrap_or_default(),
            why: params.why.clone(),
            page: params.page.clone(),
            locale: params.locale.clone(),
            widget_id: params.widget_id.clone(),
            business_id,
        };

        if let Err(err) = state.store.append(&draft, unix_millis()) {
            tracing::debug!(error = %err, "widget event insert failed");
        }
    });
}

// =============================================================================
// SCRIPT TEMPLATE
// =============================================================================

/// Render the embed script with the resolution inlined.
///
/// The script marks the visitor as seen client-side; the server only
/// ever reads that cookie back.
fn render_script(resolution: &TriggerResolution) -> String {
    let payload =
        serde_json::to_string(resolution).unwrap_or_else(|_| String::from("null"));

    format!(
        r#"(function () {{
  var trigger = {payload};
  try {{
    if (document.cookie.indexOf("{SEEN_COOKIE}=") === -1) {{
      document.cookie = "{SEEN_COOKIE}=1; path=/; max-age=31536000; SameSite=Lax";
    }}
  }} catch (e) {{}}
  window.MadiTrigger = trigger;
  if (typeof CustomEvent === "function") {{
    document.dispatchEvent(new CustomEvent("madi:trigger", {{ detail: trigger }}));
  }}
}})();
"#
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use madi_core::TriggerType;

    #[test]
    fn script_embeds_resolution_and_cookie() {
        let resolution = TriggerResolution::new(
            "first_visit",
            TriggerType::Lifecycle,
            "lifecycle:first_visit",
        );
        let script = render_script(&resolution);

        assert!(script.contains("window.MadiTrigger"));
        assert!(script.contains("\"code\":\"first_visit\""));
        assert!(script.contains("\"type\":\"lifecycle\""));
        assert!(script.contains("madi_seen=1"));
    }
}
