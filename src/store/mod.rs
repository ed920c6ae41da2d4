//! Game persistence.
//!
//! A [`GameStore`] holds one [`GameRecord`] per game: the derived match
//! state next to the delivery log it was computed from. Saves are guarded
//! by optimistic versioning so a stale read cannot silently clobber a
//! newer record.

pub mod errors;
pub mod file;
pub mod memory;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::DeliveryLog;
use crate::state::MatchState;

pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Everything persisted for one game.
///
/// The ledger is the source of truth; the state rides along so reads do
/// not pay for a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Derived match state as of the last applied entry
    pub state: MatchState,
    /// Append-only delivery log
    pub ledger: DeliveryLog,
    /// Optimistic concurrency stamp, bumped on every save
    pub version: u64,
}

impl GameRecord {
    /// Record for a freshly created game with an empty ledger
    pub fn new(state: MatchState) -> Self {
        Self {
            state,
            ledger: DeliveryLog::new(),
            version: 1,
        }
    }

    pub fn game_id(&self) -> Uuid {
        self.state.game_id
    }
}

/// Boxed future returned by store methods
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Persistence seam for game records.
///
/// `save_game` performs an optimistic version check: the incoming record
/// must carry the version currently stored, and the returned record has it
/// bumped. Implementations do not serialize concurrent writers beyond that
/// check; the service keeps one writer per game.
pub trait GameStore: Send + Sync {
    /// Insert a new game, failing if the id is taken
    fn create_game(&self, record: GameRecord) -> StoreFuture<'_, ()>;

    /// Fetch a game by id
    fn load_game(&self, game_id: Uuid) -> StoreFuture<'_, GameRecord>;

    /// Persist a changed record, returning it with the version bumped
    fn save_game(&self, record: GameRecord) -> StoreFuture<'_, GameRecord>;

    /// Ids of every stored game, in unspecified order
    fn list_games(&self) -> StoreFuture<'_, Vec<Uuid>>;
}
