//! # Primitives
//!
//! Shared bounds and identifier types.
//!
//! All limits are enforced before data reaches the store, so a single
//! oversized request cannot bloat the event log.

use serde::{Deserialize, Serialize};

// =============================================================================
// BOUNDS
// =============================================================================

/// Maximum byte length of a trigger code.
pub const MAX_CODE_LEN: usize = 128;

/// Maximum byte length of free-text event fields (`why`, `page`).
pub const MAX_TEXT_LEN: usize = 2048;

/// Maximum byte length of identifier fields (widget, business, locale).
pub const MAX_ID_LEN: usize = 128;

/// Maximum number of events returned by a single listing query.
pub const MAX_RECENT_LIMIT: usize = 500;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a stored analytics event.
///
/// Assigned by the event store as a monotonically increasing counter,
/// so ids double as insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EventId(pub u64);

impl EventId {
    /// The next id in sequence, saturating at the numeric limit.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
