//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! The in-memory [`PersonStore`] plays the read-through cache role: point
//! lookups hit process memory first and fall back to the database on a
//! miss. The optional Postgres pool is the durability layer — saves write
//! through, searches query it directly when configured, and
//! [`AppState::hydrate_from_db`] warms the store on startup. Without a
//! pool the store is the only state.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use qazid_core::{Iin, Phone};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored person record.
///
/// The `iin` is unique across the registry and is the lookup key. It is
/// held as the validated [`Iin`] newtype, so a record in the store always
/// carries a checksum-correct identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonRecord {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub iin: Iin,
    #[schema(value_type = String)]
    pub phone: Phone,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe, cloneable in-memory person store keyed by IIN.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug, Clone, Default)]
pub struct PersonStore {
    data: Arc<RwLock<HashMap<String, PersonRecord>>>,
}

impl PersonStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record if its IIN is not already present.
    ///
    /// The check and the insert run under a single write lock, so two
    /// concurrent saves of the same IIN cannot both succeed. Returns the
    /// existing record on conflict.
    pub fn insert_new(&self, record: PersonRecord) -> Result<(), PersonRecord> {
        let mut guard = self.data.write();
        match guard.entry(record.iin.as_str().to_string()) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Retrieve a record by IIN.
    pub fn get(&self, iin: &str) -> Option<PersonRecord> {
        self.data.read().get(iin).cloned()
    }

    /// Remove a record by IIN, returning it if present.
    ///
    /// Used to roll back an insert whose database write failed, keeping the
    /// store a subset of the durable state.
    pub fn remove(&self, iin: &str) -> Option<PersonRecord> {
        self.data.write().remove(iin)
    }

    /// Case-insensitive substring search over person names.
    ///
    /// Results are sorted by `(name, iin)` so pagination is stable across
    /// calls. Returns the requested page and the total number of matches.
    pub fn search_by_name(
        &self,
        fragment: &str,
        offset: usize,
        limit: usize,
    ) -> (Vec<PersonRecord>, usize) {
        let needle = fragment.to_lowercase();
        let mut hits: Vec<PersonRecord> = self
            .data
            .read()
            .values()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.iin.as_str().cmp(b.iin.as_str()))
        });

        let total = hits.len();
        let page = hits.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }

    /// Bulk-load records, replacing any existing entries with the same IIN.
    ///
    /// Used for startup hydration from the database.
    pub fn load(&self, records: impl IntoIterator<Item = PersonRecord>) {
        let mut guard = self.data.write();
        for record in records {
            guard.insert(record.iin.as_str().to_string(), record);
        }
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Application configuration, built from the environment in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in [`PersonStore`] and `PgPool`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Person records, keyed by IIN.
    pub people: PersonStore,

    /// PostgreSQL connection pool for durable persistence.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// Create application state with default configuration and no database.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create application state with the given configuration and optional pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            people: PersonStore::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate the in-memory store from the database.
    ///
    /// No-op in in-memory-only mode. Called once on startup, before the
    /// listener binds.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let people = crate::db::people::load_all(pool)
            .await
            .map_err(|e| format!("failed to load people: {e}"))?;
        let count = people.len();
        self.people.load(people);
        tracing::info!(count, "hydrated person store from database");

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, iin: &str) -> PersonRecord {
        let now = Utc::now();
        PersonRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            iin: Iin::new(iin).expect("valid test IIN"),
            phone: Phone::new("77011234567").expect("valid test phone"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn insert_new_stores_record() {
        let store = PersonStore::new();
        store.insert_new(record("Aigerim", "930214350965")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("930214350965").unwrap().name, "Aigerim");
    }

    #[test]
    fn insert_new_rejects_duplicate_iin() {
        let store = PersonStore::new();
        store.insert_new(record("Aigerim", "930214350965")).unwrap();
        let existing = store
            .insert_new(record("Someone Else", "930214350965"))
            .unwrap_err();
        assert_eq!(existing.name, "Aigerim");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = PersonStore::new();
        assert!(store.get("930214350965").is_none());
    }

    #[test]
    fn remove_rolls_back_insert() {
        let store = PersonStore::new();
        store.insert_new(record("Aigerim", "930214350965")).unwrap();
        let removed = store.remove("930214350965").unwrap();
        assert_eq!(removed.name, "Aigerim");
        assert!(store.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = PersonStore::new();
        store.insert_new(record("Aigerim Satpayeva", "930214350965")).unwrap();
        store.insert_new(record("Dulat Nurmeden", "050123500100")).unwrap();

        let (hits, total) = store.search_by_name("aigerim", 0, 10);
        assert_eq!(total, 1);
        assert_eq!(hits[0].name, "Aigerim Satpayeva");

        let (hits, total) = store.search_by_name("E", 0, 10);
        assert_eq!(total, 2);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn search_sorts_by_name_and_paginates() {
        let store = PersonStore::new();
        store.insert_new(record("Cara", "930214350965")).unwrap();
        store.insert_new(record("Alia", "050123500100")).unwrap();
        store.insert_new(record("Bela", "851231400001")).unwrap();

        let (page_one, total) = store.search_by_name("a", 0, 2);
        assert_eq!(total, 3);
        assert_eq!(page_one[0].name, "Alia");
        assert_eq!(page_one[1].name, "Bela");

        let (page_two, total) = store.search_by_name("a", 2, 2);
        assert_eq!(total, 3);
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].name, "Cara");
    }

    #[test]
    fn search_offset_past_end_is_empty_page() {
        let store = PersonStore::new();
        store.insert_new(record("Alia", "050123500100")).unwrap();

        let (hits, total) = store.search_by_name("alia", 10, 10);
        assert_eq!(total, 1);
        assert!(hits.is_empty());
    }

    #[test]
    fn load_replaces_existing_entries() {
        let store = PersonStore::new();
        store.insert_new(record("Old Name", "930214350965")).unwrap();
        store.load(vec![record("New Name", "930214350965")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("930214350965").unwrap().name, "New Name");
    }

    #[tokio::test]
    async fn hydrate_without_pool_is_noop() {
        let state = AppState::new();
        state.hydrate_from_db().await.unwrap();
        assert!(state.people.is_empty());
    }
}
