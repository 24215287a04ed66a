//! Per-location timer state, session stats and the tracker context object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{PersistedState, Store};
use crate::{COOLDOWN_DURATION_MS, GATHER_DURATION_MS, Location};

/// Timer bookkeeping and counters for a single location.
///
/// At most one of `chop_end` / `cool_end` is set at a time; starting a
/// cooldown clears any pending chop deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationState {
	/// Gathering in progress until this instant (ms since epoch).
	pub chop_end: Option<u64>,
	/// Tree regrowing until this instant (ms since epoch).
	pub cool_end: Option<u64>,
	/// Logs collected at this location.
	pub logs: u64,
	/// Experience accumulated at this location.
	pub xp: f64,
	/// True once the pre-expiry alert fired for the current `chop_end`.
	/// Transient: never persisted or exported.
	#[serde(skip)]
	pub pre_alert_fired: bool,
}

impl LocationState {
	fn secs_left(deadline: Option<u64>, now: u64) -> Option<u64> {
		deadline.map(|end| end.saturating_sub(now) / 1000)
	}

	/// Whole seconds until the chop deadline, `None` when no chop is running.
	pub fn chop_secs_left(&self, now: u64) -> Option<u64> {
		Self::secs_left(self.chop_end, now)
	}

	/// Whole seconds until the cooldown ends, `None` when no cooldown is running.
	pub fn cool_secs_left(&self, now: u64) -> Option<u64> {
		Self::secs_left(self.cool_end, now)
	}
}

/// Session-wide counters, reset only by an explicit user action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
	pub total_logs: u64,
	pub total_xp: f64,
	pub total_chops: u64,
	/// Start of the current measurement window (ms since epoch).
	pub session_start: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
	Gathering,
	Cooldown,
}

/// Where a location change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSource {
	Manual,
	Import,
	Banner,
	Minimap,
}

impl std::fmt::Display for ActiveSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ActiveSource::Manual => "manual",
			ActiveSource::Import => "import",
			ActiveSource::Banner => "banner",
			ActiveSource::Minimap => "minimap",
		})
	}
}

/// Notifications produced by tracker operations, to be forwarded to the
/// presentation sink by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
	TimerCompleted { loc: Location, kind: TimerKind },
	PreAlert { loc: Location, secs_remaining: u64 },
	ActiveLocationChanged { loc: Location, source: ActiveSource },
}

/// The tracker context: all per-location states, the session stats, the
/// active location and the persistence adapter.
///
/// Every mutating operation persists the whole document atomically before
/// returning, so the in-memory and durable copies never diverge by more
/// than one operation.
pub struct Tracker {
	store: Store,
	locations: BTreeMap<Location, LocationState>,
	stats: SessionStats,
	active: Location,
}

impl Tracker {
	/// Restore state from the store, defaulting missing pieces.
	pub fn new(store: Store, now: u64) -> Self {
		let doc = store.load_or_default();
		let mut locations: BTreeMap<Location, LocationState> = Location::ALL
			.into_iter()
			.map(|loc| (loc, LocationState::default()))
			.collect();
		for (loc, state) in doc.locations {
			locations.insert(loc, state);
		}

		let mut stats = doc.stats;
		if stats.session_start == 0 {
			stats.session_start = now;
		}

		Self {
			store,
			locations,
			stats,
			active: doc.active,
		}
	}

	pub fn active(&self) -> Location {
		self.active
	}

	pub fn location(&self, loc: Location) -> &LocationState {
		&self.locations[&loc]
	}

	pub fn stats(&self) -> &SessionStats {
		&self.stats
	}

	pub(crate) fn locations(&self) -> &BTreeMap<Location, LocationState> {
		&self.locations
	}

	pub(crate) fn snapshot(&self) -> PersistedState {
		PersistedState {
			active: self.active,
			locations: self.locations.clone(),
			stats: self.stats.clone(),
		}
	}

	pub(crate) fn restore(
		&mut self,
		locations: BTreeMap<Location, LocationState>,
		stats: SessionStats,
	) {
		self.locations = locations;
		self.stats = stats;
	}

	fn persist(&self) {
		if let Err(err) = self.store.save(&self.snapshot()) {
			tracing::warn!(error = %err, "failed to persist tracker state");
		}
	}

	pub(crate) fn persist_now(&self) {
		self.persist();
	}

	fn state_mut(&mut self, loc: Location) -> &mut LocationState {
		self.locations.entry(loc).or_default()
	}

	/// Start (or restart) the five-minute chop timer. Always resets the
	/// deadline and re-arms the pre-alert.
	pub fn start_gathering(&mut self, loc: Location, now: u64) {
		let state = self.state_mut(loc);
		state.chop_end = Some(now + GATHER_DURATION_MS);
		state.pre_alert_fired = false;
		self.stats.total_chops += 1;
		self.persist();
	}

	/// Start the ten-minute regrowth cooldown, cancelling any running chop
	/// timer at that location.
	pub fn start_cooldown(&mut self, loc: Location, now: u64) {
		let state = self.state_mut(loc);
		state.cool_end = Some(now + COOLDOWN_DURATION_MS);
		state.chop_end = None;
		state.pre_alert_fired = false;
		self.persist();
	}

	/// Count one collected log.
	pub fn record_collection(&mut self, loc: Location) {
		self.state_mut(loc).logs += 1;
		self.stats.total_logs += 1;
		self.persist();
	}

	/// Add experience. Negative or non-finite amounts are ignored.
	pub fn record_experience(&mut self, loc: Location, amount: f64) {
		if !amount.is_finite() || amount < 0.0 {
			return;
		}
		self.state_mut(loc).xp += amount;
		self.stats.total_xp += amount;
		self.persist();
	}

	/// Switch the active location. No-op (and no event) when `loc` is
	/// already active, so repeated banner detections don't re-alert.
	pub fn set_active(&mut self, loc: Location, source: ActiveSource) -> Option<Event> {
		if loc == self.active {
			return None;
		}
		self.active = loc;
		self.persist();
		Some(Event::ActiveLocationChanged { loc, source })
	}

	/// Advance all timers.
	///
	/// Expired deadlines are cleared and reported as [`Event::TimerCompleted`].
	/// The pre-expiry alert fires once per chop deadline, only for the active
	/// location, when `pre_alert_secs` (clamped to 1..=60) or fewer seconds
	/// remain.
	pub fn tick(&mut self, now: u64, pre_alert_secs: u64) -> Vec<Event> {
		let threshold = pre_alert_secs.clamp(1, 60);
		let active = self.active;
		let mut events = Vec::new();
		let mut changed = false;

		for loc in Location::ALL {
			let state = self.state_mut(loc);

			if let Some(left) = state.chop_secs_left(now) {
				if left == 0 {
					state.chop_end = None;
					state.pre_alert_fired = false;
					changed = true;
					events.push(Event::TimerCompleted {
						loc,
						kind: TimerKind::Gathering,
					});
				} else if loc == active && left <= threshold && !state.pre_alert_fired {
					state.pre_alert_fired = true;
					events.push(Event::PreAlert {
						loc,
						secs_remaining: left,
					});
				}
			}

			if let Some(left) = state.cool_secs_left(now) {
				if left == 0 {
					state.cool_end = None;
					changed = true;
					events.push(Event::TimerCompleted {
						loc,
						kind: TimerKind::Cooldown,
					});
				}
			}
		}

		if changed {
			self.persist();
		}
		events
	}

	/// Clear timers and counters for every location. Session stats are
	/// untouched; see [`Tracker::reset_stats`].
	pub fn reset_locations(&mut self) {
		for state in self.locations.values_mut() {
			*state = LocationState::default();
		}
		self.persist();
	}

	/// Zero the session counters and restart the measurement window.
	pub fn reset_stats(&mut self, now: u64) {
		self.stats = SessionStats {
			session_start: now,
			..SessionStats::default()
		};
		self.persist();
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn test_tracker() -> (Tracker, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let store = Store::new(dir.path().join("state.json"));
		(Tracker::new(store, T0), dir)
	}

	pub(crate) const T0: u64 = 1_700_000_000_000;

	#[test]
	fn gathering_timer_counts_down() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);

		let events = t.tick(T0 + 30_000, 10);
		assert!(events.is_empty());

		let state = t.location(t.active());
		assert_eq!(state.chop_secs_left(T0 + 30_000), Some(270));
		assert!(!state.pre_alert_fired);
	}

	#[test]
	fn gathering_completion_emits_once_and_clears() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);

		let events = t.tick(T0 + GATHER_DURATION_MS, 10);
		assert_eq!(
			events,
			vec![Event::TimerCompleted {
				loc: Location::Edgeville,
				kind: TimerKind::Gathering,
			}]
		);
		assert_eq!(t.location(Location::Edgeville).chop_end, None);
		assert!(!t.location(Location::Edgeville).pre_alert_fired);

		// A later tick must not re-report the same completion.
		assert!(t.tick(T0 + GATHER_DURATION_MS + 1000, 10).is_empty());
	}

	#[test]
	fn pre_alert_fires_exactly_once_per_deadline() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);

		// 9 seconds remaining, threshold 10.
		let events = t.tick(T0 + GATHER_DURATION_MS - 9_000, 10);
		assert_eq!(
			events,
			vec![Event::PreAlert {
				loc: Location::Edgeville,
				secs_remaining: 9,
			}]
		);

		// Still inside the window: no second alert.
		assert!(t.tick(T0 + GATHER_DURATION_MS - 5_000, 10).is_empty());

		// A fresh deadline re-arms the alert.
		t.start_gathering(Location::Edgeville, T0 + GATHER_DURATION_MS);
		let events = t.tick(T0 + 2 * GATHER_DURATION_MS - 3_000, 10);
		assert!(matches!(events.as_slice(), [Event::PreAlert { .. }]));
	}

	#[test]
	fn pre_alert_only_for_active_location() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);
		t.set_active(Location::Varrock, ActiveSource::Manual);

		// Edgeville's timer is in the pre-alert window but no longer active.
		assert!(t.tick(T0 + GATHER_DURATION_MS - 5_000, 10).is_empty());

		// Its completion is still reported.
		let events = t.tick(T0 + GATHER_DURATION_MS, 10);
		assert_eq!(
			events,
			vec![Event::TimerCompleted {
				loc: Location::Edgeville,
				kind: TimerKind::Gathering,
			}]
		);
	}

	#[test]
	fn pre_alert_threshold_is_clamped() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);

		// 61s remaining, threshold asks for 200 but clamps to 60.
		assert!(t.tick(T0 + GATHER_DURATION_MS - 61_000, 200).is_empty());
		let events = t.tick(T0 + GATHER_DURATION_MS - 60_000, 200);
		assert!(matches!(events.as_slice(), [Event::PreAlert { secs_remaining: 60, .. }]));
	}

	#[test]
	fn cooldown_always_clears_chop_deadline() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);
		t.start_cooldown(Location::Edgeville, T0 + 1_000);

		let state = t.location(Location::Edgeville);
		assert_eq!(state.chop_end, None);
		assert_eq!(state.cool_end, Some(T0 + 1_000 + COOLDOWN_DURATION_MS));

		let events = t.tick(T0 + 1_000 + COOLDOWN_DURATION_MS, 10);
		assert_eq!(
			events,
			vec![Event::TimerCompleted {
				loc: Location::Edgeville,
				kind: TimerKind::Cooldown,
			}]
		);
	}

	#[test]
	fn counters_accumulate_per_location_and_session() {
		let (mut t, _dir) = test_tracker();
		t.record_collection(Location::Edgeville);
		t.record_collection(Location::Edgeville);
		t.record_experience(Location::Edgeville, 1234.5);
		t.record_experience(Location::Edgeville, -5.0); // ignored

		let state = t.location(Location::Edgeville);
		assert_eq!(state.logs, 2);
		assert_eq!(state.xp, 1234.5);
		assert_eq!(t.stats().total_logs, 2);
		assert_eq!(t.stats().total_xp, 1234.5);
	}

	#[test]
	fn start_gathering_counts_a_chop() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);
		t.start_gathering(Location::Edgeville, T0 + 1_000);
		assert_eq!(t.stats().total_chops, 2);
		// Restart always resets the deadline.
		assert_eq!(
			t.location(Location::Edgeville).chop_end,
			Some(T0 + 1_000 + GATHER_DURATION_MS)
		);
	}

	#[test]
	fn set_active_deduplicates() {
		let (mut t, _dir) = test_tracker();
		assert_eq!(t.set_active(Location::Edgeville, ActiveSource::Banner), None);
		assert_eq!(
			t.set_active(Location::Yanille, ActiveSource::Minimap),
			Some(Event::ActiveLocationChanged {
				loc: Location::Yanille,
				source: ActiveSource::Minimap,
			})
		);
		assert_eq!(t.set_active(Location::Yanille, ActiveSource::Banner), None);
	}

	#[test]
	fn state_survives_restart() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");

		let mut t = Tracker::new(Store::new(path.clone()), T0);
		t.set_active(Location::Varrock, ActiveSource::Manual);
		t.start_gathering(Location::Varrock, T0);
		t.record_collection(Location::Varrock);
		t.record_experience(Location::Varrock, 50.0);

		let t2 = Tracker::new(Store::new(path), T0 + 60_000);
		assert_eq!(t2.active(), Location::Varrock);
		let state = t2.location(Location::Varrock);
		assert_eq!(state.chop_end, Some(T0 + GATHER_DURATION_MS));
		assert_eq!(state.logs, 1);
		// Transient flag never persists.
		assert!(!state.pre_alert_fired);
		// Session start survives rather than resetting to "now".
		assert_eq!(t2.stats().session_start, T0);
		assert_eq!(t2.stats().total_chops, 1);
	}

	#[test]
	fn resets_are_scoped() {
		let (mut t, _dir) = test_tracker();
		t.start_gathering(Location::Edgeville, T0);
		t.record_collection(Location::Edgeville);

		t.reset_locations();
		assert_eq!(*t.location(Location::Edgeville), LocationState::default());
		assert_eq!(t.stats().total_logs, 1);

		t.reset_stats(T0 + 5_000);
		assert_eq!(t.stats().total_logs, 0);
		assert_eq!(t.stats().session_start, T0 + 5_000);
	}
}
