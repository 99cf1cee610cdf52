use chrono::{DateTime, Utc};
use rowgate_data::prelude::*;
use rowgate_data::{CountPlan, ErrorKind, FilterOp, InsertPlan, Predicate, SelectPlan, StoreTx};
use rowgate_data_sqlx::{sqlite_pool_options, SqlxStore};
use sqlx::Sqlite;

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: i64,
    title: String,
    body: Option<String>,
    rating: f64,
    pinned: bool,
    created_at: DateTime<Utc>,
}

const TITLE: Column = Column::new("title", SqlType::VarChar(40));
const BODY: Column = Column::new("body", SqlType::Text);
const RATING: Column = Column::new("rating", SqlType::Decimal);
const PINNED: Column = Column::new("pinned", SqlType::Bool);

const NOTE_COLUMNS: [Column; 6] = [
    Column::new("id", SqlType::Integer),
    TITLE,
    BODY,
    RATING,
    PINNED,
    Column::new("created_at", SqlType::Timestamp),
];

impl Entity for Note {
    fn table_name() -> &'static str {
        "notes"
    }
    fn id_column() -> &'static str {
        "id"
    }
    fn columns() -> &'static [Column] {
        &NOTE_COLUMNS
    }
    fn from_record(record: Record) -> Result<Self, DataError> {
        Ok(Self {
            id: record.get_i64("id")?,
            title: record.get_str("title")?,
            body: record.get_opt_str("body")?,
            rating: record.get_f64("rating")?,
            pinned: record.get_bool("pinned")?,
            created_at: record.get_timestamp("created_at")?,
        })
    }
    fn id(&self) -> i64 {
        self.id
    }
}

async fn store() -> SqlxStore<Sqlite> {
    // one connection: every connection to sqlite::memory: is its own database
    let pool = sqlite_pool_options()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title VARCHAR(40) NOT NULL UNIQUE,
            body TEXT,
            rating REAL NOT NULL,
            pinned BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    for (title, body, rating, pinned) in [
        ("groceries", Some("milk, eggs"), 3.0, true),
        ("ideas", None, 4.5, false),
        ("100% done", Some("finished"), 2.0, false),
        ("taxes", Some("due in april"), 1.5, true),
    ] {
        sqlx::query("INSERT INTO notes (title, body, rating, pinned) VALUES (?, ?, ?, ?)")
            .bind(title)
            .bind(body)
            .bind(rating)
            .bind(pinned)
            .execute(&pool)
            .await
            .unwrap();
    }
    SqlxStore::new(pool)
}

fn insert_plan(title: &str) -> InsertPlan {
    InsertPlan::for_entity::<Note>(vec![
        ("title", TITLE.bind(title).unwrap()),
        ("rating", RATING.bind(5.0).unwrap()),
    ])
}

#[tokio::test]
async fn test_fetch_decodes_declared_types() {
    let store = store().await;
    let plan = SelectPlan::for_entity::<Note>(Predicate::All).order_by("id", true);
    let notes = store
        .fetch(&plan)
        .await
        .unwrap()
        .into_iter()
        .map(Note::from_record)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(notes.len(), 4);
    assert_eq!(notes[0].title, "groceries");
    assert!(notes[0].pinned);
    assert_eq!(notes[1].body, None);
    assert_eq!(notes[1].rating, 4.5);
}

#[tokio::test]
async fn test_count_under_predicate() {
    let store = store().await;
    let pinned = Predicate::clause(&PINNED, FilterOp::Eq, PINNED.bind(true).unwrap());
    assert_eq!(store.count(&CountPlan::new("notes", pinned)).await.unwrap(), 2);
    assert_eq!(store.count(&CountPlan::all("notes")).await.unwrap(), 4);
}

#[tokio::test]
async fn test_paged_read_through_pager() {
    let store = store().await;
    let pager = Pager::<Note, _>::new(store, &DataConfig::default());
    let filter = FilterSpec::new().gte(RATING, 2.0);
    let page = pager.paginate(&filter, &PageRequest::new(2, 2)).await.unwrap();
    assert_eq!(page.filtered_total, 3);
    assert_eq!(page.unfiltered_total, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "100% done");
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let store = store().await;
    let pager = Pager::<Note, _>::new(store, &DataConfig::default());

    let filter = FilterSpec::new().contains_any(&[TITLE, BODY], Some("100%"));
    let page = pager.paginate(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(page.filtered_total, 1);

    let filter = FilterSpec::new().contains_any(&[TITLE, BODY], Some("APRIL"));
    let page = pager.paginate(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(page.items[0].title, "taxes");

    let filter = FilterSpec::new().contains(TITLE, Some("' OR 1=1 --"));
    let page = pager.paginate(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(page.filtered_total, 0);
    assert_eq!(page.unfiltered_total, 4);
}

#[tokio::test]
async fn test_case_folding_covers_non_ascii() {
    let store = store().await;
    sqlx::query(
        "INSERT INTO notes (title, body, rating) VALUES ('Élan Vital', 'ÜBER alles', 3.5)",
    )
    .execute(store.pool())
    .await
    .unwrap();
    let pager = Pager::<Note, _>::new(store, &DataConfig::default());

    for term in ["élan", "ÉLAN", "über"] {
        let filter = FilterSpec::new().contains_any(&[TITLE, BODY], Some(term));
        let page = pager.paginate(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.filtered_total, 1, "term {term}");
        assert_eq!(page.items[0].title, "Élan Vital");
    }

    for title in ["élan vital", "Élan Vital", "ÉLAN VITAL"] {
        let filter = FilterSpec::new().eq_ignore_case(TITLE, Some(title));
        let page = pager.paginate(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.filtered_total, 1, "title {title}");
    }
}

#[tokio::test]
async fn test_insert_returns_key_and_reads_back_in_tx() {
    let store = store().await;
    let mut tx = store.begin().await.unwrap();
    let id = tx.insert(&insert_plan("fresh")).await.unwrap();
    let rows = tx.fetch(&SelectPlan::by_id::<Note>(id).unwrap()).await.unwrap();
    let note = Note::from_record(rows.into_iter().next().unwrap()).unwrap();
    assert_eq!(note.id, id);
    assert!(!note.pinned);
    tx.commit().await.unwrap();
    assert_eq!(store.count(&CountPlan::all("notes")).await.unwrap(), 5);
}

#[tokio::test]
async fn test_rollback_discards_insert() {
    let store = store().await;
    let mut tx = store.begin().await.unwrap();
    tx.insert(&insert_plan("draft")).await.unwrap();
    tx.rollback().await.unwrap();
    assert_eq!(store.count(&CountPlan::all("notes")).await.unwrap(), 4);
}

#[tokio::test]
async fn test_dropped_tx_discards_insert() {
    let store = store().await;
    {
        let mut tx = store.begin().await.unwrap();
        tx.insert(&insert_plan("draft")).await.unwrap();
    }
    assert_eq!(store.count(&CountPlan::all("notes")).await.unwrap(), 4);
}

#[tokio::test]
async fn test_unique_violation_is_integrity_error() {
    let store = store().await;
    let mut tx = store.begin().await.unwrap();
    let err = tx.insert(&insert_plan("ideas")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataIntegrityViolation);
}

#[tokio::test]
async fn test_closed_pool_is_unavailable() {
    let store = store().await;
    store.pool().close().await;
    let err = store.count(&CountPlan::all("notes")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}
