//! SQLite-based store implementation

use chrono::NaiveDateTime;
use farepass_api::RECORD_VERSION;
use farepass_util::PassId;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{AuditEvent, AuditEventType, PassRecord, Store, StoreError, StoreResult};

/// Timestamp layout used in the audit log
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing and the demo)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                pass_id INTEGER,
                event_json TEXT NOT NULL
            );

            -- Latest snapshot of each pass
            CREATE TABLE IF NOT EXISTS passes (
                pass_id INTEGER PRIMARY KEY,
                owner TEXT NOT NULL,
                status TEXT NOT NULL,
                record_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_pass ON audit_log(pass_id);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    fn read_audits(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<AuditEvent>> {
        let mut stmt = conn.prepare(sql)?;

        let rows = stmt.query_map(params, |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = NaiveDateTime::parse_from_str(&timestamp_str, TIMESTAMP_FORMAT)
                .map_err(|e| {
                    StoreError::Serialization(format!(
                        "bad audit timestamp '{}': {}",
                        timestamp_str, e
                    ))
                })?;
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn decode_record(json: &str) -> StoreResult<PassRecord> {
        let record: PassRecord = serde_json::from_str(json)?;
        if record.record_version != RECORD_VERSION {
            return Err(StoreError::UnsupportedRecordVersion {
                found: record.record_version,
                expected: RECORD_VERSION,
            });
        }
        Ok(record)
    }
}

/// SQLite integers are signed; ids past `i64::MAX` cannot be stored
fn pass_key(pass_id: PassId) -> StoreResult<i64> {
    i64::try_from(pass_id.as_u64()).map_err(|_| StoreError::PassIdOutOfRange(pass_id))
}

impl Store for SqliteStore {
    fn append_audit(&self, event: AuditEvent) -> StoreResult<i64> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;
        let pass_id = event.event.pass_id().map(pass_key).transpose()?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, pass_id, event_json) VALUES (?, ?, ?)",
            params![
                event.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                pass_id,
                event_json
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(event_id = id, "Audit event appended");

        Ok(id)
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;
        Self::read_audits(
            &conn,
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
            [limit as i64],
        )
    }

    fn get_pass_audits(&self, pass_id: PassId, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;
        Self::read_audits(
            &conn,
            "SELECT id, timestamp, event_json FROM audit_log WHERE pass_id = ? ORDER BY id DESC LIMIT ?",
            [pass_key(pass_id)?, limit as i64],
        )
    }

    fn save_pass(&self, record: &PassRecord) -> StoreResult<()> {
        let conn = self.conn()?;
        let json = serde_json::to_string(record)?;

        conn.execute(
            r#"
            INSERT INTO passes (pass_id, owner, status, record_json)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(pass_id)
            DO UPDATE SET status = excluded.status, record_json = excluded.record_json
            "#,
            params![
                pass_key(record.pass_id)?,
                record.owner,
                record.status.to_string(),
                json
            ],
        )?;

        debug!(pass_id = %record.pass_id, status = %record.status, "Pass snapshot saved");
        Ok(())
    }

    fn load_pass(&self, pass_id: PassId) -> StoreResult<Option<PassRecord>> {
        let conn = self.conn()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM passes WHERE pass_id = ?",
                [pass_key(pass_id)?],
                |row| row.get(0),
            )
            .optional()?;

        json.as_deref().map(Self::decode_record).transpose()
    }

    fn load_passes(&self) -> StoreResult<Vec<PassRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT record_json FROM passes ORDER BY pass_id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::decode_record(&row?)?);
        }

        Ok(records)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PassRecordKind;
    use chrono::NaiveDate;
    use farepass_api::{DenialReason, PassKindTag, PassStatus, RemainingTrips};

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_pass_id_beyond_sqlite_range() {
        let store = SqliteStore::in_memory().unwrap();
        let too_large = PassId::from_raw(i64::MAX as u64 + 1);

        let record = PassRecord::new(
            too_large,
            "Ivan".into(),
            PassStatus::Active,
            PassRecordKind::Unlimited,
        );
        assert!(matches!(
            store.save_pass(&record),
            Err(StoreError::PassIdOutOfRange(id)) if id == too_large
        ));
        assert!(matches!(
            store.load_pass(too_large),
            Err(StoreError::PassIdOutOfRange(_))
        ));
        assert!(store.get_pass_audits(too_large, 10).is_err());
        assert!(
            store
                .append_audit(AuditEvent::new(
                    ts(8, 0, 0),
                    AuditEventType::PassActivated {
                        pass_id: too_large,
                        changed: false,
                    },
                ))
                .is_err()
        );

        // Nothing was written with a wrapped key
        assert!(store.load_passes().unwrap().is_empty());
        assert!(store.get_recent_audits(10).unwrap().is_empty());

        let largest = PassId::from_raw(i64::MAX as u64);
        store
            .save_pass(&PassRecord::new(
                largest,
                "Petr".into(),
                PassStatus::Active,
                PassRecordKind::Unlimited,
            ))
            .unwrap();
        assert!(store.load_pass(largest).unwrap().is_some());
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        let event = AuditEvent::new(ts(8, 0, 0), AuditEventType::CatalogLoaded { pass_count: 3 });
        let id = store.append_audit(event).unwrap();
        assert!(id > 0);

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id);
        assert_eq!(events[0].timestamp, ts(8, 0, 0));
        assert!(matches!(
            events[0].event,
            AuditEventType::CatalogLoaded { pass_count: 3 }
        ));
    }

    #[test]
    fn test_recent_audits_newest_first_and_limited() {
        let store = SqliteStore::in_memory().unwrap();
        let pass_id = PassId::from_raw(1);

        for trips in [2, 1, 0] {
            store
                .append_audit(AuditEvent::new(
                    ts(9, 0, trips),
                    AuditEventType::TripConsumed {
                        pass_id,
                        remaining: RemainingTrips::Limited(trips),
                    },
                ))
                .unwrap();
        }

        let events = store.get_recent_audits(2).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].event,
            AuditEventType::TripConsumed {
                remaining: RemainingTrips::Limited(0),
                ..
            }
        ));
    }

    #[test]
    fn test_pass_audits_filtered() {
        let store = SqliteStore::in_memory().unwrap();
        let first = PassId::from_raw(1);
        let second = PassId::from_raw(2);

        store
            .append_audit(AuditEvent::new(
                ts(10, 0, 0),
                AuditEventType::TripDenied {
                    pass_id: first,
                    reason: DenialReason::Exhausted,
                },
            ))
            .unwrap();
        store
            .append_audit(AuditEvent::new(
                ts(10, 0, 1),
                AuditEventType::PassDeactivated {
                    pass_id: second,
                    changed: true,
                },
            ))
            .unwrap();
        store
            .append_audit(AuditEvent::new(
                ts(10, 0, 2),
                AuditEventType::CatalogLoaded { pass_count: 2 },
            ))
            .unwrap();

        let events = store.get_pass_audits(second, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.pass_id(), Some(second));
    }

    #[test]
    fn test_pass_snapshots() {
        let store = SqliteStore::in_memory().unwrap();
        let pass_id = PassId::from_raw(3);

        // Nothing stored initially
        assert!(store.load_pass(pass_id).unwrap().is_none());
        assert!(store.load_passes().unwrap().is_empty());

        let mut record = PassRecord::new(
            pass_id,
            "Sidor Sidorov".into(),
            PassStatus::Active,
            PassRecordKind::CountBounded { remaining_trips: 10 },
        );
        store.save_pass(&record).unwrap();

        // Overwrite with a later state
        record.status = PassStatus::Inactive;
        record.kind = PassRecordKind::CountBounded { remaining_trips: 4 };
        store.save_pass(&record).unwrap();

        let loaded = store.load_pass(pass_id).unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.kind.tag(), PassKindTag::CountBounded);

        let all = store.load_passes().unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_load_passes_ordered_by_id() {
        let store = SqliteStore::in_memory().unwrap();

        for raw in [5, 1, 3] {
            store
                .save_pass(&PassRecord::new(
                    PassId::from_raw(raw),
                    format!("owner-{}", raw),
                    PassStatus::Active,
                    PassRecordKind::Unlimited,
                ))
                .unwrap();
        }

        let ids: Vec<u64> = store
            .load_passes()
            .unwrap()
            .iter()
            .map(|r| r.pass_id.as_u64())
            .collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farepass.db");
        let expires_at = ts(0, 0, 0);

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .save_pass(&PassRecord::new(
                    PassId::from_raw(1),
                    "Petr Petrov".into(),
                    PassStatus::Active,
                    PassRecordKind::TimeBounded { expires_at },
                ))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.load_pass(PassId::from_raw(1)).unwrap().unwrap();
        assert_eq!(loaded.kind, PassRecordKind::TimeBounded { expires_at });
    }

    #[test]
    fn test_rejects_unknown_record_version() {
        let store = SqliteStore::in_memory().unwrap();
        let mut record = PassRecord::new(
            PassId::from_raw(1),
            "Ivan Ivanov".into(),
            PassStatus::Active,
            PassRecordKind::Unlimited,
        );
        record.record_version = 99;
        store.save_pass(&record).unwrap();

        let result = store.load_passes();
        assert!(matches!(
            result,
            Err(StoreError::UnsupportedRecordVersion { found: 99, .. })
        ));
    }
}
