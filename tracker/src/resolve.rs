//! Heuristic matching of noisy recognized text against the location registry.

use crate::Location;

fn letters_only(text: &str) -> String {
	text.chars().filter(|c| c.is_alphabetic()).collect()
}

/// Pick the best-matching registry location for a recognized text fragment.
///
/// Scoring per location: 2 when the lowercased name appears as a substring,
/// 1 when the letters-only name appears inside the letters-only input
/// (tolerates OCR garbage between characters being stripped away), else 0.
/// Ties go to the first location in registry order. `None` when nothing
/// scores above 0. This is intentionally not a whole-word match.
pub fn resolve_location(raw: &str) -> Option<Location> {
	let lower = raw.to_lowercase();
	if lower.trim().is_empty() {
		return None;
	}
	let stripped = letters_only(&lower);

	let mut best: Option<(Location, u8)> = None;
	for loc in Location::ALL {
		let name = loc.name().to_lowercase();
		let score = if lower.contains(&name) {
			2
		} else if stripped.contains(&letters_only(&name)) {
			1
		} else {
			0
		};
		if score > best.map_or(0, |(_, s)| s) {
			best = Some((loc, score));
		}
	}
	best.map(|(loc, _)| loc)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn substring_match_scores_highest() {
		assert_eq!(
			resolve_location("you are near varrock west bank"),
			Some(Location::Varrock)
		);
	}

	#[test]
	fn stripped_match_tolerates_garbled_separators() {
		assert_eq!(resolve_location("v-a-r-r-o-c-k"), Some(Location::Varrock));
		assert_eq!(resolve_location("Ya nil le"), Some(Location::Yanille));
	}

	#[test]
	fn substring_beats_stripped() {
		// "yanille" appears verbatim; "varrock" only survives stripping.
		assert_eq!(
			resolve_location("yanille v.a.r.r.o.c.k"),
			Some(Location::Yanille)
		);
	}

	#[test]
	fn ties_break_in_registry_order() {
		assert_eq!(
			resolve_location("edgeville and varrock"),
			Some(Location::Edgeville)
		);
	}

	#[test]
	fn no_match_yields_none() {
		assert_eq!(resolve_location("nowhere recognizable"), None);
		assert_eq!(resolve_location(""), None);
		assert_eq!(resolve_location("   "), None);
	}
}
