//! Filter store integration tests
//!
//! Exercises revision bookkeeping together with the record ordering and flag
//! semantics, as a pipeline assembler and a flag monitor would use them.

use chrono::{Duration, TimeZone, Utc};
use portico_gateway::error::GatewayError;
use portico_gateway::filter::InMemoryFilterStore;
use portico_kernel::filter::{FilterError, FilterRecord, FilterRow, FilterType};
use std::collections::HashSet;
use std::sync::Arc;

fn inbound(name: &str) -> FilterRow {
    FilterRow::new("api", FilterType::Inbound, name, format!("filter {name}"))
}

#[test]
fn rollout_from_canary_to_fleet() {
    let store = InMemoryFilterStore::new();
    let id = "api:Auth:in";

    store.add_revision(inbound("Auth")).unwrap();
    store.activate(id, 1).unwrap();

    store.add_revision(inbound("Auth")).unwrap();
    store.set_canary(id, 2).unwrap();

    assert_eq!(store.active(id).unwrap().revision(), 1);
    assert_eq!(store.canary(id).unwrap().revision(), 2);
    assert_eq!(store.canary_filters().unwrap()[0].revision(), 2);
    assert_eq!(store.active_filters().unwrap()[0].revision(), 1);

    store.activate(id, 2).unwrap();
    let active: Vec<_> = store.revisions(id).iter().filter(|r| r.is_active()).map(|r| r.revision()).collect();
    assert_eq!(active, vec![2]);
    assert!(store.canary(id).is_none());
}

#[test]
fn active_filters_use_record_ordering() {
    let store = InMemoryFilterStore::new();
    for name in ["alpha", "gamma", "beta"] {
        let record = store.add_revision(inbound(name)).unwrap();
        store.activate(record.id(), record.revision()).unwrap();
    }

    let names: Vec<String> = store
        .active_filters()
        .unwrap()
        .iter()
        .map(|record| record.name().to_string())
        .collect();
    assert_eq!(names, vec!["gamma", "beta", "alpha"]);
}

#[test]
fn same_name_in_other_stage_orders_newest_first() {
    let store = InMemoryFilterStore::new();
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let inbound_auth = store
        .add_revision(inbound("Auth").with_creation_date(base))
        .unwrap();
    let outbound_auth = store
        .add_revision(
            FilterRow::new("api", FilterType::Outbound, "Auth", "x")
                .with_creation_date(base + Duration::minutes(5)),
        )
        .unwrap();
    store.activate(inbound_auth.id(), 1).unwrap();
    store.activate(outbound_auth.id(), 1).unwrap();

    let active = store.active_filters().unwrap();
    assert_eq!(active[0].filter_type(), FilterType::Outbound);
    assert_eq!(active[1].filter_type(), FilterType::Inbound);
}

#[test]
fn undated_duplicates_fail_ordering() {
    let store = InMemoryFilterStore::new();
    store
        .save(FilterRecord::from_row(
            inbound("Auth").with_revision(1).with_flags(true, false),
        ))
        .unwrap();
    store
        .save(FilterRecord::from_row(
            FilterRow::new("api", FilterType::Outbound, "Auth", "x")
                .with_revision(1)
                .with_flags(true, false),
        ))
        .unwrap();

    let err = store.active_filters().unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Filter(FilterError::MissingCreationDate { ref name }) if name == "Auth"
    ));
}

#[test]
fn records_are_shared_with_the_store() {
    let store = InMemoryFilterStore::new();
    let record = store.add_revision(inbound("Auth")).unwrap();
    let fetched = store.get(record.id(), 1).unwrap();
    assert!(Arc::ptr_eq(&record, &fetched));

    record.set_canary(true);
    assert_eq!(store.canary("api:Auth:in").unwrap().revision(), 1);
}

#[test]
fn revision_keys_stay_stable_across_flag_flips() {
    let store = InMemoryFilterStore::new();
    let record = store.add_revision(inbound("Auth")).unwrap();

    let mut keys = HashSet::new();
    keys.insert(record.revision_key());
    store.activate(record.id(), 1).unwrap();
    assert!(keys.contains(&record.revision_key()));
}

#[test]
fn concurrent_revisions_get_distinct_numbers() {
    let store = InMemoryFilterStore::new();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    store.add_revision(inbound("Auth")).unwrap();
                }
            });
        }
    });

    let revisions: Vec<i32> = store
        .revisions("api:Auth:in")
        .iter()
        .map(|record| record.revision())
        .collect();
    assert_eq!(revisions.len(), 100);
    assert_eq!(revisions, (1..=100).rev().collect::<Vec<_>>());
}

#[test]
fn removed_filter_is_gone() {
    let store = InMemoryFilterStore::new();
    store.add_revision(inbound("Auth")).unwrap();
    store.add_revision(inbound("Log")).unwrap();

    store.remove("api:Auth:in").unwrap();
    assert_eq!(store.ids(), vec!["api:Log:in"]);
    assert!(store.latest("api:Auth:in").is_none());
    assert_eq!(store.next_revision("api:Auth:in").unwrap(), 1);
}
