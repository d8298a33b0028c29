//! Score book: best score per address, kept in a JSON file
//!
//! The file is a flat object `{ "<address>": <score>, ... }`, rewritten
//! whenever a best score improves.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::records::Records;

/// Score book failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("score file io failed: {0}")]
    Io(#[from] io::Error),
    #[error("score file is not a valid score map: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("address must not be empty")]
    EmptyAddress,
}

/// Best score per address
#[derive(Debug, Default)]
pub struct ScoreBook {
    /// Backing file (None keeps scores in memory only)
    path: Option<PathBuf>,
    scores: BTreeMap<String, u64>,
}

impl ScoreBook {
    /// Score book with no backing file
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the score file, creating it empty if it doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let scores = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::write(&path, "{}")?;
                log::info!("Created empty score file at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        let book = Self {
            path: Some(path),
            scores,
        };
        log::info!("Loaded {} scores", book.len());
        Ok(book)
    }

    /// Store `score` if it beats the address's best (or there is none yet).
    /// Returns whether anything changed.
    pub fn save_if_higher(&mut self, address: &str, score: u64) -> Result<bool, StoreError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(StoreError::EmptyAddress);
        }

        match self.scores.get(address) {
            Some(&best) if score <= best => return Ok(false),
            _ => {}
        }

        let previous = self.scores.insert(address.to_string(), score);
        if let Err(e) = self.persist() {
            // Keep memory and file in agreement
            match previous {
                Some(best) => self.scores.insert(address.to_string(), best),
                None => self.scores.remove(address),
            };
            return Err(e);
        }

        log::debug!("New best for {}: {}", address, score);
        Ok(true)
    }

    /// Best score for one address
    pub fn best(&self, address: &str) -> Option<u64> {
        self.scores.get(address.trim()).copied()
    }

    /// Highest score across every address (0 when empty)
    pub fn world_record(&self) -> u64 {
        self.scores.values().copied().max().unwrap_or(0)
    }

    /// World and personal record for `address`
    pub fn records(&self, address: &str) -> Records {
        Records {
            world_record: self.world_record(),
            personal_record: self.best(address).unwrap_or(0),
        }
    }

    pub fn scores(&self) -> &BTreeMap<String, u64> {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Write through a temp file so a crash never leaves half a file behind
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.scores)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ALICE: &str = "0xa11ce";
    const BOB: &str = "0xb0b";

    fn test_book() -> (ScoreBook, TempDir) {
        let dir = TempDir::new().unwrap();
        let book = ScoreBook::open(dir.path().join("scores.json")).unwrap();
        (book, dir)
    }

    #[test]
    fn open_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        let book = ScoreBook::open(&path).unwrap();
        assert!(book.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn higher_score_replaces_lower() {
        let (mut book, _dir) = test_book();
        assert!(book.save_if_higher(ALICE, 10).unwrap());
        assert!(book.save_if_higher(ALICE, 25).unwrap());
        assert_eq!(book.best(ALICE), Some(25));
    }

    #[test]
    fn lower_or_equal_score_is_ignored() {
        let (mut book, _dir) = test_book();
        book.save_if_higher(ALICE, 25).unwrap();
        assert!(!book.save_if_higher(ALICE, 3).unwrap());
        assert!(!book.save_if_higher(ALICE, 25).unwrap());
        assert_eq!(book.best(ALICE), Some(25));
    }

    #[test]
    fn zero_is_a_valid_first_score() {
        let (mut book, _dir) = test_book();
        assert!(book.save_if_higher(ALICE, 0).unwrap());
        assert_eq!(book.best(ALICE), Some(0));
    }

    #[test]
    fn records_for_unknown_address() {
        let (mut book, _dir) = test_book();
        assert_eq!(book.records(BOB), Records::default());

        book.save_if_higher(ALICE, 40).unwrap();
        let records = book.records(BOB);
        assert_eq!(records.world_record, 40);
        assert_eq!(records.personal_record, 0);
    }

    #[test]
    fn world_record_is_max() {
        let (mut book, _dir) = test_book();
        book.save_if_higher(ALICE, 40).unwrap();
        book.save_if_higher(BOB, 90).unwrap();
        assert_eq!(
            book.records(ALICE),
            Records {
                world_record: 90,
                personal_record: 40,
            }
        );
    }

    #[test]
    fn scores_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        {
            let mut book = ScoreBook::open(&path).unwrap();
            book.save_if_higher(ALICE, 12).unwrap();
            book.save_if_higher(BOB, 7).unwrap();
        }
        let book = ScoreBook::open(&path).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.best(ALICE), Some(12));
        assert_eq!(book.best(BOB), Some(7));
    }

    #[test]
    fn empty_address_is_rejected() {
        let (mut book, _dir) = test_book();
        assert!(matches!(
            book.save_if_higher("  ", 5),
            Err(StoreError::EmptyAddress)
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(ScoreBook::open(&path), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn in_memory_book_never_touches_disk() {
        let mut book = ScoreBook::in_memory();
        assert!(book.save_if_higher(ALICE, 3).unwrap());
        assert_eq!(book.world_record(), 3);
    }
}
