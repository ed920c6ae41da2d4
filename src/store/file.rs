//! File-backed game store.
//!
//! One JSON document per game under a root directory, named
//! `<game_id>.json`. The record itself is embedded as a string payload
//! next to a CRC32 checksum so torn or hand-edited files are detected on
//! load instead of surfacing as scoring bugs. I/O runs on the calling
//! task.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::{GameRecord, GameStore, StoreFuture};

/// On-disk document format version
const FORMAT_VERSION: u8 = 1;

/// Envelope written to disk for each game.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    /// Envelope format version
    format_version: u8,
    /// CRC32 of the payload bytes, formatted `crc32:xxxxxxxx`
    checksum: String,
    /// The serialized [`GameRecord`]
    payload: String,
}

/// Stores each game as a checksummed JSON file.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn game_path(&self, game_id: Uuid) -> PathBuf {
        self.root.join(format!("{game_id}.json"))
    }

    fn read_record(&self, game_id: Uuid) -> StoreResult<GameRecord> {
        let path = self.game_path(game_id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(game_id));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let document: StoredDocument = serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupt(format!("unreadable envelope at {}: {e}", path.display()))
        })?;

        if document.format_version != FORMAT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported format version {} at {}",
                document.format_version,
                path.display()
            )));
        }

        let expected = parse_checksum(&document.checksum).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "malformed checksum '{}' at {}",
                document.checksum,
                path.display()
            ))
        })?;
        let actual = compute_checksum(document.payload.as_bytes());
        if actual != expected {
            return Err(StoreError::Corrupt(format!(
                "checksum mismatch at {}: stored {}, computed {}",
                path.display(),
                format_checksum(expected),
                format_checksum(actual)
            )));
        }

        serde_json::from_str(&document.payload).map_err(|e| {
            StoreError::Corrupt(format!("unreadable record at {}: {e}", path.display()))
        })
    }

    fn write_record(&self, record: &GameRecord) -> StoreResult<()> {
        let payload = serde_json::to_string(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let document = StoredDocument {
            format_version: FORMAT_VERSION,
            checksum: format_checksum(compute_checksum(payload.as_bytes())),
            payload,
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let path = self.game_path(record.game_id());
        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

impl GameStore for FileStore {
    fn create_game(&self, record: GameRecord) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let game_id = record.game_id();
            if self.game_path(game_id).exists() {
                return Err(StoreError::AlreadyExists(game_id));
            }
            self.write_record(&record)
        })
    }

    fn load_game(&self, game_id: Uuid) -> StoreFuture<'_, GameRecord> {
        Box::pin(async move { self.read_record(game_id) })
    }

    fn save_game(&self, record: GameRecord) -> StoreFuture<'_, GameRecord> {
        Box::pin(async move {
            let game_id = record.game_id();
            let stored = self.read_record(game_id)?;

            if stored.version != record.version {
                return Err(StoreError::VersionConflict {
                    game_id,
                    stored: stored.version,
                    attempted: record.version,
                });
            }

            let mut updated = record;
            updated.version += 1;
            self.write_record(&updated)?;
            Ok(updated)
        })
    }

    fn list_games(&self) -> StoreFuture<'_, Vec<Uuid>> {
        Box::pin(async move {
            let mut ids = Vec::new();
            for entry in fs::read_dir(&self.root)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(id) = stem.parse::<Uuid>() {
                        ids.push(id);
                    }
                }
            }
            Ok(ids)
        })
    }
}

/// CRC32 (IEEE polynomial) over the given bytes. Deterministic.
fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Format: `crc32:xxxxxxxx`, lowercase hex, zero-padded
fn format_checksum(checksum: u32) -> String {
    format!("crc32:{checksum:08x}")
}

fn parse_checksum(formatted: &str) -> Option<u32> {
    let stripped = formatted.strip_prefix("crc32:")?;
    u32::from_str_radix(stripped, 16).ok()
}
