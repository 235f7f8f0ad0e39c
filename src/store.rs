use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::score::BestScoreStore;

const STORE_VERSION: u8 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BestScoreFile {
    version: u8,
    #[serde(rename = "bestScore", alias = "best_score")]
    best_score: u64,
    #[serde(rename = "updatedAt", alias = "updated_at", default)]
    updated_at: Option<String>,
}

/// Best score persisted as a small JSON document. I/O failures are logged
/// and the in-memory value keeps serving the game.
pub struct JsonBestScoreStore {
    file_path: PathBuf,
    best_score: u64,
}

impl JsonBestScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let best_score = match load_best_score(&file_path) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("[best-score] {error}; starting from 0");
                0
            }
        };
        Self {
            file_path,
            best_score,
        }
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let payload = BestScoreFile {
            version: STORE_VERSION,
            best_score: self.best_score,
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        let text = serde_json::to_string_pretty(&payload).map_err(|source| StoreError::Encode {
            path: self.file_path.clone(),
            source,
        })?;
        fs::write(&self.file_path, text).map_err(|source| StoreError::Io {
            path: self.file_path.clone(),
            source,
        })
    }
}

impl BestScoreStore for JsonBestScoreStore {
    fn get_best_score(&self) -> u64 {
        self.best_score
    }

    fn set_best_score(&mut self, score: u64) {
        if score <= self.best_score {
            return;
        }
        self.best_score = score;
        if let Err(error) = self.save() {
            log::warn!("[best-score] {error}");
        }
    }
}

fn load_best_score(path: &Path) -> Result<u64, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let parsed: BestScoreFile = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(error) => {
            log::warn!("[best-score] failed to parse {}: {error}", path.display());
            return Ok(0);
        }
    };
    if parsed.version != STORE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: parsed.version,
        });
    }
    Ok(parsed.best_score)
}

/// Store that lives only as long as the process; counts writes for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryBestScoreStore {
    best_score: u64,
    writes: usize,
}

impl MemoryBestScoreStore {
    pub fn new(best_score: u64) -> Self {
        Self {
            best_score,
            writes: 0,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BestScoreStore for MemoryBestScoreStore {
    fn get_best_score(&self) -> u64 {
        self.best_score
    }

    fn set_best_score(&mut self, score: u64) {
        if score > self.best_score {
            self.best_score = score;
            self.writes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{JsonBestScoreStore, MemoryBestScoreStore};
    use crate::score::BestScoreStore;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("maze-chase-{name}-{now}"))
            .join("best.json")
    }

    #[test]
    fn json_store_round_trips_best_score() {
        let path = temp_path("roundtrip");
        let mut store = JsonBestScoreStore::new(path.clone());
        assert_eq!(store.get_best_score(), 0);
        store.set_best_score(1_234);
        store.set_best_score(1_000);

        let reopened = JsonBestScoreStore::new(path.clone());
        assert_eq!(reopened.get_best_score(), 1_234);
        let _ = std::fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn corrupt_file_starts_from_zero() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        std::fs::write(&path, "not json").expect("write");
        let store = JsonBestScoreStore::new(path.clone());
        assert_eq!(store.get_best_score(), 0);
        let _ = std::fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let path = temp_path("version");
        std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        std::fs::write(&path, r#"{"version": 9, "bestScore": 50}"#).expect("write");
        let store = JsonBestScoreStore::new(path.clone());
        assert_eq!(store.get_best_score(), 0);
        let _ = std::fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn memory_store_only_counts_improvements() {
        let mut store = MemoryBestScoreStore::new(10);
        store.set_best_score(5);
        store.set_best_score(11);
        assert_eq!(store.get_best_score(), 11);
        assert_eq!(store.writes(), 1);
    }
}
