use crate::models::{Card, VocabItem};
use anyhow::Result;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use std::path::Path;
use uuid::Uuid;

/// Schema executed at every startup. The `cards` table is replaced wholesale
/// by `replace_cards`, so only `examples` needs to survive between runs.
///
/// Examples are strictly append-only; no UPDATE or DELETE is ever issued
/// against that table.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS examples (
    id   TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    body TEXT NOT NULL
);
";

const CARDS_DDL: &str = "
CREATE TABLE cards (
    id                TEXT PRIMARY KEY,
    batch_number      INTEGER,
    front_text        TEXT,
    back_text         TEXT,
    learned_timestamp INTEGER
);
";

/// A card database backed by a single SQLite file.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) a store at `path` and runs schema initialisation.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory store — useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Drops any previous card table and inserts the given cards in one
    /// transaction. Returns the number of rows written.
    pub fn replace_cards(&mut self, cards: &[Card]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS cards;")?;
        tx.execute_batch(CARDS_DDL)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cards (id, batch_number, front_text, back_text, learned_timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for card in cards {
                stmt.execute(rusqlite::params![
                    card.id,
                    card.batch_number,
                    card.front_text,
                    card.back_text,
                    card.learned_timestamp,
                ])?;
            }
        }
        tx.commit()?;
        Ok(cards.len())
    }

    /// Returns at most `limit` vocabulary items from cards outside
    /// `excluded_batch`, shuffled with the caller's RNG. Cards that are empty
    /// on both sides are dropped and do not count toward the limit.
    pub fn sample_vocabulary<R: Rng + ?Sized>(
        &self,
        excluded_batch: i64,
        limit: usize,
        rng: &mut R,
    ) -> Result<Vec<VocabItem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT front_text, back_text FROM cards WHERE batch_number != ?1")?;
        let mut items: Vec<VocabItem> = stmt
            .query_map([excluded_batch], |row| {
                Ok(VocabItem {
                    front: row.get(0)?,
                    back: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        items.retain(|item| !item.is_empty());
        items.shuffle(rng);
        items.truncate(limit);
        Ok(items)
    }

    /// Appends a generated example and returns its freshly assigned id.
    pub fn insert_example(&self, body: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let date = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO examples (id, date, body) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, date, body],
        )?;
        Ok(id)
    }

    pub fn count_examples(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM examples", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
fn card(batch: i64, front: &str, back: &str) -> Card {
    Card {
        id: Uuid::new_v4().to_string(),
        batch_number: batch,
        front_text: front.to_string(),
        back_text: back.to_string(),
        learned_timestamp: 0,
    }
}

#[test]
fn test_sample_is_capped_at_limit() {
    let mut store = Store::open_in_memory().unwrap();
    let cards: Vec<Card> = (0..40).map(|i| card(2, &format!("f{}", i), "b")).collect();
    store.replace_cards(&cards).unwrap();

    let sample = store.sample_vocabulary(1, 15, &mut rand::rng()).unwrap();
    assert_eq!(sample.len(), 15);
}

#[test]
fn test_sample_returns_all_when_below_limit() {
    let mut store = Store::open_in_memory().unwrap();
    let cards = vec![card(2, "a", "b"), card(3, "c", "d")];
    store.replace_cards(&cards).unwrap();

    let sample = store.sample_vocabulary(1, 15, &mut rand::rng()).unwrap();
    assert_eq!(sample.len(), 2);
}

#[test]
fn test_sample_excludes_batch_and_empty_cards() {
    let mut store = Store::open_in_memory().unwrap();
    let cards = vec![
        card(1, "excluded", "excluded"),
        card(2, "", ""),
        card(2, "kept", ""),
        card(3, "", "kept too"),
    ];
    store.replace_cards(&cards).unwrap();

    let sample = store.sample_vocabulary(1, 15, &mut rand::rng()).unwrap();
    assert_eq!(sample.len(), 2);
    for item in &sample {
        assert_ne!(item.front, "excluded");
        assert!(!item.is_empty());
    }
}

#[test]
fn test_sample_from_empty_store_is_empty() {
    let mut store = Store::open_in_memory().unwrap();
    store.replace_cards(&[]).unwrap();

    let sample = store.sample_vocabulary(1, 15, &mut rand::rng()).unwrap();
    assert!(sample.is_empty());
}

#[test]
fn test_replace_cards_discards_previous_rows() {
    let mut store = Store::open_in_memory().unwrap();
    store.replace_cards(&[card(2, "old", "old")]).unwrap();
    store.replace_cards(&[card(2, "new", "new")]).unwrap();

    let sample = store.sample_vocabulary(1, 15, &mut rand::rng()).unwrap();
    assert_eq!(sample.len(), 1);
    assert_eq!(sample[0].front, "new");
}

#[test]
fn test_examples_accumulate_across_inserts() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(store.count_examples().unwrap(), 0);

    let first = store.insert_example("A: Hallo [Cześć]").unwrap();
    let second = store.insert_example("B: Danke [Dziękuję]").unwrap();
    assert_ne!(first, second);
    assert_eq!(store.count_examples().unwrap(), 2);
}
