//! # Event Module
//!
//! Analytics event records: one row per trigger resolution a widget acted
//! on, attributed to a business (tenant).
//!
//! The core validates and shapes records; it never reads a clock. Creation
//! timestamps are unix milliseconds injected by the caller, and ids are
//! assigned by the store's monotonic counter.

use crate::primitives::{EventId, MAX_CODE_LEN, MAX_ID_LEN, MAX_TEXT_LEN};
use crate::resolution::TriggerType;
use serde::{Deserialize, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

/// Validation failure for an event draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("event field '{0}' must not be empty")]
    Empty(&'static str),

    #[error("event field '{field}' exceeds {max} bytes (got {got})")]
    TooLong {
        field: &'static str,
        max: usize,
        got: usize,
    },
}

// =============================================================================
// EVENT DRAFT
// =============================================================================

/// An event as submitted, before the store assigns id and timestamp.
///
/// `business_id` is required: tenant resolution happens at the boundary,
/// and an unattributable event is rejected there, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub code: String,
    pub kind: TriggerType,
    pub why: Option<String>,
    pub page: Option<String>,
    pub locale: Option<String>,
    pub widget_id: Option<String>,
    pub business_id: String,
}

impl EventDraft {
    /// Check field presence and length bounds.
    pub fn validate(&self) -> Result<(), EventError> {
        check_required("code", &self.code, MAX_CODE_LEN)?;
        check_required("business_id", &self.business_id, MAX_ID_LEN)?;
        check_optional("why", self.why.as_deref(), MAX_TEXT_LEN)?;
        check_optional("page", self.page.as_deref(), MAX_TEXT_LEN)?;
        check_optional("locale", self.locale.as_deref(), MAX_ID_LEN)?;
        check_optional("widget_id", self.widget_id.as_deref(), MAX_ID_LEN)?;
        Ok(())
    }
}

fn check_required(field: &'static str, value: &str, max: usize) -> Result<(), EventError> {
    if value.trim().is_empty() {
        return Err(EventError::Empty(field));
    }
    check_len(field, value, max)
}

fn check_optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), EventError> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), EventError> {
    if value.len() > max {
        return Err(EventError::TooLong {
            field,
            max,
            got: value.len(),
        });
    }
    Ok(())
}

// =============================================================================
// EVENT RECORD
// =============================================================================

/// A stored analytics event.
///
/// Flat on purpose: the record is the postcard row format, and the row
/// format carries no nesting so it stays stable and self-contained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub created_at_ms: u64,
    pub code: String,
    pub kind: TriggerType,
    pub why: Option<String>,
    pub page: Option<String>,
    pub locale: Option<String>,
    pub widget_id: Option<String>,
    pub business_id: String,
}

impl EventRecord {
    /// Assemble a record from a validated draft.
    #[must_use]
    pub fn from_draft(id: EventId, created_at_ms: u64, draft: EventDraft) -> Self {
        Self {
            id,
            created_at_ms,
            code: draft.code,
            kind: draft.kind,
            why: draft.why,
            page: draft.page,
            locale: draft.locale,
            widget_id: draft.widget_id,
            business_id: draft.business_id,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
