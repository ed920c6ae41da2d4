//! In-memory game store.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::{GameRecord, GameStore, StoreFuture};

/// Hash map behind a lock. The store of choice for tests, replays and the
/// simulator; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<Uuid, GameRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_read<T>(
        &self,
        f: impl FnOnce(&HashMap<Uuid, GameRecord>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let games = self
            .games
            .read()
            .map_err(|_| StoreError::Corrupt("game table lock poisoned".to_string()))?;
        f(&games)
    }

    fn with_write<T>(
        &self,
        f: impl FnOnce(&mut HashMap<Uuid, GameRecord>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut games = self
            .games
            .write()
            .map_err(|_| StoreError::Corrupt("game table lock poisoned".to_string()))?;
        f(&mut games)
    }
}

impl GameStore for MemoryStore {
    fn create_game(&self, record: GameRecord) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.with_write(|games| {
                let game_id = record.game_id();
                if games.contains_key(&game_id) {
                    return Err(StoreError::AlreadyExists(game_id));
                }
                games.insert(game_id, record);
                Ok(())
            })
        })
    }

    fn load_game(&self, game_id: Uuid) -> StoreFuture<'_, GameRecord> {
        Box::pin(async move {
            self.with_read(|games| {
                games
                    .get(&game_id)
                    .cloned()
                    .ok_or(StoreError::NotFound(game_id))
            })
        })
    }

    fn save_game(&self, record: GameRecord) -> StoreFuture<'_, GameRecord> {
        Box::pin(async move {
            self.with_write(|games| {
                let game_id = record.game_id();
                let stored = games.get(&game_id).ok_or(StoreError::NotFound(game_id))?;

                if stored.version != record.version {
                    return Err(StoreError::VersionConflict {
                        game_id,
                        stored: stored.version,
                        attempted: record.version,
                    });
                }

                let mut updated = record;
                updated.version += 1;
                games.insert(game_id, updated.clone());
                Ok(updated)
            })
        })
    }

    fn list_games(&self) -> StoreFuture<'_, Vec<Uuid>> {
        Box::pin(async move { self.with_read(|games| Ok(games.keys().copied().collect())) })
    }
}
