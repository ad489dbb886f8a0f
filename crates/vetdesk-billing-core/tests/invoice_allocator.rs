//! Invoice number allocation tests

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use common::{new_year, MockDb};
use vetdesk_billing_core::{InvoiceNumberAllocator, ManualClock};
use vetdesk_types::{ClinicId, DateKey, InvoiceSequenceKey};

fn allocator(db: &MockDb, clock: Arc<ManualClock>) -> InvoiceNumberAllocator {
    InvoiceNumberAllocator::new(db.stores().invoice_sequences, clock)
}

fn setup() -> (MockDb, Arc<ManualClock>, InvoiceNumberAllocator) {
    let db = MockDb::new();
    let clock = Arc::new(ManualClock::new(new_year()));
    let alloc = allocator(&db, clock.clone());
    (db, clock, alloc)
}

#[tokio::test]
async fn test_first_number_of_the_day() {
    let (_db, _clock, alloc) = setup();
    let clinic = ClinicId::new();

    let number = alloc.allocate(&clinic).await.unwrap();
    assert_eq!(number.to_string(), "20250101-001");
}

#[tokio::test]
async fn test_continues_after_highest_stored_sequence() {
    let (db, _clock, alloc) = setup();
    let clinic = ClinicId::new();
    for seq in [3, 7, 5] {
        db.insert_invoice(MockDb::invoice_row(clinic.0, "20250101", seq));
    }

    let number = alloc.allocate(&clinic).await.unwrap();
    assert_eq!(number.to_string(), "20250101-008");
}

#[tokio::test]
async fn test_grows_past_three_digits() {
    let (db, _clock, alloc) = setup();
    let clinic = ClinicId::new();
    db.insert_invoice(MockDb::invoice_row(clinic.0, "20250101", 999));

    let number = alloc.allocate(&clinic).await.unwrap();
    assert_eq!(number.to_string(), "20250101-1000");
}

#[tokio::test]
async fn test_sequential_allocations_have_no_gaps() {
    let (_db, _clock, alloc) = setup();
    let clinic = ClinicId::new();

    let mut numbers = Vec::new();
    for _ in 0..12 {
        numbers.push(alloc.allocate(&clinic).await.unwrap().to_string());
    }

    let expected: Vec<String> = (1..=12).map(|n| format!("20250101-{n:03}")).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn test_clinics_have_independent_sequences() {
    let (_db, _clock, alloc) = setup();
    let a = ClinicId::new();
    let b = ClinicId::new();

    assert_eq!(alloc.allocate(&a).await.unwrap().sequence, 1);
    assert_eq!(alloc.allocate(&a).await.unwrap().sequence, 2);
    assert_eq!(alloc.allocate(&b).await.unwrap().sequence, 1);
}

#[tokio::test]
async fn test_sequence_restarts_each_day() {
    let (_db, clock, alloc) = setup();
    let clinic = ClinicId::new();

    alloc.allocate(&clinic).await.unwrap();
    alloc.allocate(&clinic).await.unwrap();

    clock.advance(Duration::days(1));
    let number = alloc.allocate(&clinic).await.unwrap();
    assert_eq!(number.to_string(), "20250102-001");
}

#[tokio::test]
async fn test_explicit_key() {
    let (_db, _clock, alloc) = setup();
    let date = DateKey::new(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    let key = InvoiceSequenceKey::new(ClinicId::new(), date);

    assert_eq!(alloc.allocate_for(key).await.unwrap().to_string(), "20240229-001");
    assert_eq!(alloc.allocate_for(key).await.unwrap().to_string(), "20240229-002");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_unique() {
    let (_db, _clock, alloc) = setup();
    let clinic = ClinicId::new();
    let tasks = 64;

    let handles: Vec<_> = (0..tasks)
        .map(|_| {
            let alloc = alloc.clone();
            tokio::spawn(async move { alloc.allocate(&clinic).await.unwrap() })
        })
        .collect();

    let numbers: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().sequence)
        .collect();

    let unique: HashSet<_> = numbers.iter().copied().collect();
    assert_eq!(unique.len(), tasks);
    assert_eq!(unique, (1..=tasks as u32).collect());
}
