//! Integration tests for farepass
//!
//! These tests drive the registry end to end: config catalog, consumption
//! rules, audit trail, and restoring from an on-disk store.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use farepass_api::{ConsumeResult, DenialReason, PassKindTag, PassSpec, PassStatus, RemainingTrips};
use farepass_config::parse_config;
use farepass_core::{PassEvent, PassRegistry};
use farepass_store::{AuditEventType, SqliteStore, Store};
use farepass_util::{DATABASE_FILENAME, ManualClock, PassError, PassId};
use std::sync::Arc;

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 19)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn make_registry() -> (PassRegistry, Arc<ManualClock>, Arc<dyn Store>) {
    let clock = Arc::new(ManualClock::new(start_time()));
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let registry = PassRegistry::new(clock.clone(), store.clone());
    (registry, clock, store)
}

#[test]
fn test_count_bounded_lifecycle() {
    let (mut registry, _clock, _store) = make_registry();
    let pass_id = registry
        .issue(&PassSpec::count_bounded("Sidor Sidorov", 10))
        .unwrap();

    let results: Vec<ConsumeResult> = (0..12)
        .map(|_| registry.consume(pass_id).unwrap().result)
        .collect();

    for (i, result) in results.iter().take(10).enumerate() {
        assert_eq!(
            *result,
            ConsumeResult::Consumed(RemainingTrips::Limited(9 - i as u32))
        );
    }
    assert_eq!(results[10], ConsumeResult::DeniedExhausted);
    assert_eq!(results[11], ConsumeResult::DeniedExhausted);

    // Exhaustion does not deactivate
    assert_eq!(registry.info(pass_id).unwrap().status, PassStatus::Active);

    registry.deactivate(pass_id).unwrap();
    assert_eq!(
        registry.consume(pass_id).unwrap().result,
        ConsumeResult::DeniedInactive
    );
    assert_eq!(
        registry.info(pass_id).unwrap().remaining_trips,
        RemainingTrips::Limited(0)
    );
}

#[test]
fn test_time_bounded_expiry() {
    let (mut registry, clock, _store) = make_registry();
    let pass_id = registry
        .issue(&PassSpec::time_bounded("Petr Petrov", "2027-10-19"))
        .unwrap();
    let expires_at = registry.info(pass_id).unwrap().expires_at.unwrap();

    clock.set(expires_at - Duration::days(1));
    assert_eq!(
        registry.consume(pass_id).unwrap().result,
        ConsumeResult::Consumed(RemainingTrips::Unbounded)
    );

    // Exactly at the expiration instant the pass is still valid
    clock.set(expires_at);
    assert!(registry.consume(pass_id).unwrap().result.is_consumed());

    clock.set(expires_at + Duration::seconds(1));
    let outcome = registry.consume(pass_id).unwrap();
    assert_eq!(outcome.result, ConsumeResult::DeniedExpired);
    assert_eq!(
        outcome.events,
        vec![
            PassEvent::Expired {
                pass_id,
                expired_at: expires_at,
            },
            PassEvent::TripDenied {
                pass_id,
                reason: DenialReason::Expired,
            },
        ]
    );
    assert_eq!(registry.info(pass_id).unwrap().status, PassStatus::Inactive);

    // Already deactivated by expiry
    assert_eq!(
        registry.consume(pass_id).unwrap().result,
        ConsumeResult::DeniedInactive
    );

    // Reactivating an expired pass only lets it expire again
    registry.activate(pass_id).unwrap();
    assert_eq!(
        registry.consume(pass_id).unwrap().result,
        ConsumeResult::DeniedExpired
    );
}

#[test]
fn test_unlimited_ignores_status() {
    let (mut registry, _clock, _store) = make_registry();
    let pass_id = registry.issue(&PassSpec::unlimited("Ivan Ivanov")).unwrap();

    registry.deactivate(pass_id).unwrap();
    let outcome = registry.consume(pass_id).unwrap();

    assert_eq!(
        outcome.result,
        ConsumeResult::Consumed(RemainingTrips::Unbounded)
    );
    assert_eq!(registry.info(pass_id).unwrap().status, PassStatus::Inactive);
}

#[test]
fn test_config_catalog_to_registry() {
    let catalog = parse_config(
        r#"
        config_version = 1

        [[passes]]
        owner = "Ivan Ivanov"
        terms = { type = "unlimited" }

        [[passes]]
        owner = "Petr Petrov"
        terms = { type = "time_bounded", expires_on = "2027-10-19" }

        [[passes]]
        owner = "Sidor Sidorov"
        terms = { type = "count_bounded", max_trips = 10 }
        "#,
    )
    .unwrap();

    let (mut registry, _clock, store) = make_registry();
    let ids = registry.issue_all(&catalog.passes).unwrap();

    assert_eq!(
        ids,
        vec![PassId::from_raw(1), PassId::from_raw(2), PassId::from_raw(3)]
    );

    let kinds: Vec<PassKindTag> = registry.list().iter().map(|p| p.kind_tag).collect();
    assert_eq!(
        kinds,
        vec![
            PassKindTag::Unlimited,
            PassKindTag::TimeBounded,
            PassKindTag::CountBounded
        ]
    );

    let audits = store.get_recent_audits(1).unwrap();
    assert_eq!(
        audits[0].event,
        AuditEventType::CatalogLoaded { pass_count: 3 }
    );
}

#[test]
fn test_rejected_issue_does_not_use_an_id() {
    let (mut registry, _clock, _store) = make_registry();

    assert!(matches!(
        registry.issue(&PassSpec::count_bounded("Sidor", -1)),
        Err(PassError::InvalidMaxTrips(-1))
    ));
    assert!(matches!(
        registry.issue(&PassSpec::unlimited("  ")),
        Err(PassError::EmptyOwner)
    ));
    assert!(matches!(
        registry.issue(&PassSpec::time_bounded("Petr", "19.10.2027")),
        Err(PassError::InvalidExpiration { .. })
    ));

    let pass_id = registry.issue(&PassSpec::unlimited("Ivan")).unwrap();
    assert_eq!(pass_id, PassId::from_raw(1));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_audit_trail_for_pass() {
    let (mut registry, clock, _store) = make_registry();
    let pass_id = registry
        .issue(&PassSpec::count_bounded("Sidor Sidorov", 1))
        .unwrap();

    clock.advance(Duration::minutes(5));
    registry.consume(pass_id).unwrap();
    registry.consume(pass_id).unwrap();
    registry.deactivate(pass_id).unwrap();
    registry.deactivate(pass_id).unwrap();

    let events: Vec<AuditEventType> = registry
        .pass_audits(pass_id, 10)
        .unwrap()
        .into_iter()
        .rev()
        .map(|e| e.event)
        .collect();

    assert_eq!(
        events,
        vec![
            AuditEventType::PassIssued {
                pass_id,
                owner: "Sidor Sidorov".into(),
                kind: PassKindTag::CountBounded,
            },
            AuditEventType::TripConsumed {
                pass_id,
                remaining: RemainingTrips::Limited(0),
            },
            AuditEventType::TripDenied {
                pass_id,
                reason: DenialReason::Exhausted,
            },
            AuditEventType::PassDeactivated {
                pass_id,
                changed: true,
            },
            AuditEventType::PassDeactivated {
                pass_id,
                changed: false,
            },
        ]
    );

    let newest = registry.pass_audits(pass_id, 1).unwrap();
    assert_eq!(newest[0].timestamp, start_time() + Duration::minutes(5));
}

#[test]
fn test_restore_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join(DATABASE_FILENAME);
    let clock = Arc::new(ManualClock::new(start_time()));

    let (count_id, time_id) = {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path).unwrap());
        let mut registry = PassRegistry::new(clock.clone(), store);

        registry.issue(&PassSpec::unlimited("Ivan Ivanov")).unwrap();
        let time_id = registry
            .issue(&PassSpec::time_bounded("Petr Petrov", "2025-10-20"))
            .unwrap();
        let count_id = registry
            .issue(&PassSpec::count_bounded("Sidor Sidorov", 5))
            .unwrap();

        for _ in 0..3 {
            registry.consume(count_id).unwrap();
        }
        registry.deactivate(count_id).unwrap();

        (count_id, time_id)
    };

    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path).unwrap());
    let mut registry = PassRegistry::restore(clock.clone(), store).unwrap();

    assert_eq!(registry.len(), 3);

    let count_info = registry.info(count_id).unwrap();
    assert_eq!(count_info.status, PassStatus::Inactive);
    assert_eq!(count_info.remaining_trips, RemainingTrips::Limited(2));

    // Restored expiration still applies
    clock.set(start_time() + Duration::days(2));
    assert_eq!(
        registry.consume(time_id).unwrap().result,
        ConsumeResult::DeniedExpired
    );

    // Id generation resumes after the largest stored id
    let next = registry.issue(&PassSpec::unlimited("Olga")).unwrap();
    assert_eq!(next, PassId::from_raw(4));

    registry.activate(count_id).unwrap();
    assert_eq!(
        registry.consume(count_id).unwrap().result,
        ConsumeResult::Consumed(RemainingTrips::Limited(1))
    );
}

#[test]
fn test_unknown_pass() {
    let (mut registry, _clock, _store) = make_registry();
    let missing = PassId::from_raw(99);

    assert!(matches!(
        registry.consume(missing),
        Err(PassError::PassNotFound(id)) if id == missing
    ));
    assert!(registry.activate(missing).is_err());
    assert!(registry.deactivate(missing).is_err());
    assert!(registry.get(missing).is_none());
}
