//! redb-backed event store and widget registry.
//!
//! Three tables:
//! - `events`: event id -> postcard-encoded [`EventRecord`], append-only
//! - `widgets`: widget id -> business id, the tenant lookup
//! - `meta`: the next event id
//!
//! Event ids come from a monotonic counter, so id order is insertion
//! order and listings are deterministic.

use crate::event::{EventDraft, EventError, EventRecord};
use crate::primitives::{EventId, MAX_RECENT_LIMIT};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

// =============================================================================
// TABLES
// =============================================================================

const EVENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("events");
const WIDGETS: TableDefinition<&str, &str> = TableDefinition::new("widgets");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_EVENT_ID: &str = "next_event_id";

// =============================================================================
// ERRORS
// =============================================================================

/// Failure while reading or writing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),

    #[error(transparent)]
    InvalidEvent(#[from] EventError),
}

// =============================================================================
// EVENT STORE
// =============================================================================

/// The analytics event store.
///
/// A single writer at a time; readers see consistent snapshots.
#[derive(Debug)]
pub struct EventStore {
    db: Database,
}

impl EventStore {
    /// Open (or create) the store at the given path.
    ///
    /// All tables are created up front so readers never observe a
    /// missing table.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let tx = db.begin_write()?;
        {
            tx.open_table(EVENTS)?;
            tx.open_table(WIDGETS)?;
            tx.open_table(META)?;
        }
        tx.commit()?;
        Ok(Self { db })
    }

    /// Append one event. Validates the draft, assigns the next id, and
    /// commits atomically. Returns the stored record.
    pub fn append(
        &self,
        draft: &EventDraft,
        created_at_ms: u64,
    ) -> Result<EventRecord, StoreError> {
        draft.validate()?;

        let tx = self.db.begin_write()?;
        let record;
        {
            let mut meta = tx.open_table(META)?;
            let id = EventId(meta.get(NEXT_EVENT_ID)?.map(|v| v.value()).unwrap_or(0));
            meta.insert(NEXT_EVENT_ID, id.next().0)?;
            drop(meta);

            record = EventRecord::from_draft(id, created_at_ms, draft.clone());
            let bytes = postcard::to_allocvec(&record)?;

            let mut events = tx.open_table(EVENTS)?;
            events.insert(record.id.0, bytes.as_slice())?;
        }
        tx.commit()?;

        Ok(record)
    }

    /// The most recent events, newest first.
    ///
    /// `limit` is clamped to [`MAX_RECENT_LIMIT`].
    pub fn recent(&self, limit: usize) -> Result<Vec<EventRecord>, StoreError> {
        let limit = limit.min(MAX_RECENT_LIMIT);
        let tx = self.db.begin_read()?;
        let events = tx.open_table(EVENTS)?;

        let mut out = Vec::new();
        for item in events.range(0..=u64::MAX)?.rev() {
            if out.len() >= limit {
                break;
            }
            let (_, value) = item?;
            out.push(postcard::from_bytes(value.value())?);
        }

        Ok(out)
    }

    /// Total number of events ever appended.
    pub fn event_count(&self) -> Result<u64, StoreError> {
        let tx = self.db.begin_read()?;
        let meta = tx.open_table(META)?;
        Ok(meta.get(NEXT_EVENT_ID)?.map(|v| v.value()).unwrap_or(0))
    }

    /// Map a widget to its owning business. Re-registering overwrites.
    pub fn register_widget(&self, widget_id: &str, business_id: &str) -> Result<(), StoreError> {
        let tx = self.db.begin_write()?;
        {
            let mut widgets = tx.open_table(WIDGETS)?;
            widgets.insert(widget_id, business_id)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Look up the business owning a widget.
    pub fn business_for_widget(&self, widget_id: &str) -> Result<Option<String>, StoreError> {
        let tx = self.db.begin_read()?;
        let widgets = tx.open_table(WIDGETS)?;
        Ok(widgets.get(widget_id)?.map(|v| v.value().to_string()))
    }

    /// All registered widgets in deterministic (key) order.
    pub fn widgets(&self) -> Result<Vec<(String, String)>, StoreError> {
        let tx = self.db.begin_read()?;
        let widgets = tx.open_table(WIDGETS)?;

        let mut out = Vec::new();
        for item in widgets.range::<&str>(..)? {
            let (key, value) = item?;
            out.push((key.value().to_string(), value.value().to_string()));
        }

        Ok(out)
    }
}

// =============================================================================
// TESTS
// =============================================================================
