//! Core logic for the elder tree timer companion.
//!
//! Everything in this crate is UI-free and driven by explicit timestamps
//! (milliseconds since the epoch) so it can be unit tested without a game
//! client attached. The [`Tracker`] context object owns all per-location
//! timer state, the session stats and the persistence adapter; recognized
//! game text enters through [`Ingestor`].

mod location;
pub use location::Location;

mod state;
pub use state::{ActiveSource, Event, LocationState, SessionStats, TimerKind, Tracker};

mod resolve;
pub use resolve::resolve_location;

mod ingest;
pub use ingest::{Ingestor, LineHit};

mod store;
pub use store::{PersistedState, Store};

mod export;
pub use export::Backup;

pub mod util;

/// A started chop runs for a fixed five minutes.
pub const GATHER_DURATION_MS: u64 = 5 * 60 * 1000;
/// A depleted tree regrows after a fixed ten minutes.
pub const COOLDOWN_DURATION_MS: u64 = 10 * 60 * 1000;

/// Wall clock in milliseconds since the epoch.
pub fn now_ms() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or(0)
}
