use serde::{Deserialize, Serialize};

/// Known elder tree locations.
///
/// The registry is fixed; variant order is detection priority order and is
/// what breaks ties in [`crate::resolve_location`].
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Location {
	Edgeville,
	Varrock,
	Yanille,
}

impl Location {
	pub const ALL: [Location; 3] = [Location::Edgeville, Location::Varrock, Location::Yanille];

	pub fn name(self) -> &'static str {
		match self {
			Location::Edgeville => "Edgeville",
			Location::Varrock => "Varrock",
			Location::Yanille => "Yanille",
		}
	}

	/// Exact (case-sensitive) registry lookup, e.g. for backup documents.
	pub fn from_name(name: &str) -> Option<Location> {
		Location::ALL.into_iter().find(|loc| loc.name() == name)
	}
}

impl std::fmt::Display for Location {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}
