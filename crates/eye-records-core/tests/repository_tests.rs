//! Repository integration tests against a store that can be made to fail.

use std::cell::Cell;

use eye_records_core::db::{Database, DbError, DbResult, PatientRow, RecordStore};
use eye_records_core::models::{EyePrescription, NewPatientRecord, ValidationError};
use eye_records_core::repository::{RecordError, RecordRepository};
use eye_records_core::UpsertOutcome;

/// Wraps a real database, counting writes and failing them on demand.
///
/// Uses the default (non-transactional) `upsert`, so the lookup-then-write
/// path of the trait is exercised too.
struct FaultyStore {
    inner: Database,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
    writes: Cell<usize>,
}

impl FaultyStore {
    fn new() -> Self {
        Self {
            inner: Database::open_in_memory().unwrap(),
            fail_writes: Cell::new(false),
            fail_reads: Cell::new(false),
            writes: Cell::new(0),
        }
    }

    fn write(&self) -> DbResult<()> {
        if self.fail_writes.get() {
            return Err(DbError::Unavailable("write rejected".into()));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn read(&self) -> DbResult<()> {
        if self.fail_reads.get() {
            return Err(DbError::Unavailable("read timed out".into()));
        }
        Ok(())
    }
}

impl RecordStore for FaultyStore {
    fn select_all(&self) -> DbResult<Vec<PatientRow>> {
        self.read()?;
        self.inner.select_all()
    }

    fn select_by_mobile(&self, mobile: &str) -> DbResult<Vec<PatientRow>> {
        self.read()?;
        self.inner.select_by_mobile(mobile)
    }

    fn insert(&self, row: &PatientRow) -> DbResult<String> {
        self.write()?;
        self.inner.insert(row)
    }

    fn update_by_mobile(&self, mobile: &str, row: &PatientRow) -> DbResult<usize> {
        self.write()?;
        self.inner.update_by_mobile(mobile, row)
    }

    fn delete_all(&self) -> DbResult<usize> {
        self.write()?;
        self.inner.delete_all()
    }
}

fn make_record(name: &str, mobile: &str) -> NewPatientRecord {
    NewPatientRecord {
        date: "2024-06-01".into(),
        name: name.into(),
        mobile: mobile.into(),
        right_eye: EyePrescription {
            sphere: "-2.25".into(),
            cylinder: "-0.50".into(),
            axis: "170".into(),
            add: "".into(),
        },
        left_eye: EyePrescription {
            sphere: "-2.00".into(),
            cylinder: "".into(),
            axis: "".into(),
            add: "".into(),
        },
        frame_price: 999.0,
        glass_price: 1499.0,
        remarks: "Photochromic".into(),
    }
}

fn setup_repo() -> RecordRepository<FaultyStore> {
    RecordRepository::open(FaultyStore::new()).unwrap()
}

#[test]
fn test_short_mobile_rejected_without_write() {
    let mut repo = setup_repo();

    let result = repo.save(&make_record("Alice", "12345"));

    assert!(matches!(
        result,
        Err(RecordError::Validation(ValidationError::InvalidMobile(_)))
    ));
    assert_eq!(repo.store().writes.get(), 0);
}

#[test]
fn test_empty_remarks_rejected_without_write() {
    let mut repo = setup_repo();

    let mut record = make_record("Alice", "9876543210");
    record.remarks = String::new();
    let result = repo.save(&record);

    assert!(matches!(
        result,
        Err(RecordError::Validation(ValidationError::MissingField("remarks")))
    ));
    assert_eq!(repo.store().writes.get(), 0);
}

#[test]
fn test_default_upsert_inserts_then_updates() {
    let mut repo = setup_repo();

    let (first, outcome) = repo
        .save_with_outcome(&make_record("Alice", "9876543210"))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);

    let (second, outcome) = repo
        .save_with_outcome(&make_record("Alice Liddell", "9876543210"))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(second.id, first.id);
    assert_eq!(repo.list().unwrap().len(), 1);
    assert_eq!(repo.store().writes.get(), 2);
}

#[test]
fn test_failed_save_leaves_list_unchanged() {
    let mut repo = setup_repo();
    repo.save(&make_record("Alice", "9876543210")).unwrap();
    let before = repo.list().unwrap().to_vec();

    repo.store().fail_writes.set(true);

    // Both the update path and the insert path fail
    let update = repo.save(&make_record("Alicia", "9876543210"));
    let insert = repo.save(&make_record("Bob", "9123456780"));
    assert!(matches!(update, Err(RecordError::Persistence(_))));
    assert!(matches!(insert, Err(RecordError::Persistence(_))));
    assert_eq!(repo.records(), before.as_slice());

    repo.store().fail_writes.set(false);
    assert_eq!(repo.list().unwrap(), before.as_slice());
}

#[test]
fn test_persistence_error_keeps_cause() {
    let mut repo = setup_repo();
    repo.store().fail_writes.set(true);

    let err = repo.save(&make_record("Alice", "9876543210")).unwrap_err();

    let source = std::error::Error::source(&err).map(|s| s.to_string());
    assert_eq!(
        source.as_deref(),
        Some("Store unavailable: write rejected")
    );
    assert!(!err.user_message().contains("write rejected"));
}

#[test]
fn test_failed_reload_keeps_snapshot() {
    let mut repo = setup_repo();
    repo.save(&make_record("Alice", "9876543210")).unwrap();
    let before = repo.records().to_vec();

    repo.store().fail_reads.set(true);
    assert!(matches!(repo.list(), Err(RecordError::Persistence(_))));
    assert!(matches!(repo.search("ali"), Err(RecordError::Persistence(_))));
    assert_eq!(repo.records(), before.as_slice());
}

#[test]
fn test_failed_clear_keeps_snapshot() {
    let mut repo = setup_repo();
    repo.save(&make_record("Alice", "9876543210")).unwrap();
    repo.save(&make_record("Bob", "9123456780")).unwrap();

    repo.store().fail_writes.set(true);
    assert!(matches!(repo.clear_all(), Err(RecordError::Persistence(_))));
    assert_eq!(repo.count(), 2);

    repo.store().fail_writes.set(false);
    repo.clear_all().unwrap();
    assert_eq!(repo.count(), 0);
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn test_find_by_mobile_absent_is_not_an_error() {
    let repo = setup_repo();
    assert_eq!(repo.find_by_mobile("9876543210").unwrap(), None);
}

#[test]
fn test_open_fails_when_store_unreachable() {
    let store = FaultyStore::new();
    store.fail_reads.set(true);
    assert!(matches!(
        RecordRepository::open(store),
        Err(RecordError::Persistence(_))
    ));
}

#[test]
fn test_edit_flow_round_trip() {
    let mut repo = RecordRepository::open(Database::open_in_memory().unwrap()).unwrap();
    let original = repo.save(&make_record("Alice", "9876543210")).unwrap();

    // Edit screen: load by mobile, change a field, save again
    let stored = repo.find_by_mobile("9876543210").unwrap().unwrap();
    let mut draft = NewPatientRecord::from(stored);
    draft.left_eye.add = "+1.50".into();
    draft.frame_price = 1999.0;
    let edited = repo.save(&draft).unwrap();

    assert_eq!(edited.id, original.id);
    assert_eq!(edited.left_eye.add, "+1.50");
    assert_eq!(edited.total_price, 1999.0 + 1499.0);
    assert_eq!(edited.right_eye, original.right_eye);
}
