//! Snapshot assembly: the read model handed to viewers and the broadcaster.

pub mod builder;
pub mod view;

pub use builder::build_view;
pub use view::{Batsmen, DlsPanel, MatchPhase, ScoreLine, SnapshotView};
