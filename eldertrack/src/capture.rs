//! Game-window lookup and region capture (xcap).
//!
//! Region geometry mirrors the in-game layout: the depletion popup sits in
//! the center of the window, the area-name banner near the top-left and the
//! minimap label in the top-right corner. Every function returns `Option`;
//! a missing window or an out-of-bounds region is never an error.

use xcap::image::RgbaImage;

/// Geometry of the captured game window, in physical pixels.
#[derive(Debug, Clone, Copy)]
pub struct WindowBounds {
	pub width: u32,
	pub height: u32,
}

/// A pixel rectangle relative to the game window's top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct Region {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

pub fn find_window(app_name: &str) -> Option<xcap::Window> {
	let windows = xcap::Window::all().ok()?;
	windows
		.into_iter()
		.find(|window| window.app_name().ok().as_deref() == Some(app_name))
}

pub fn window_bounds(app_name: &str) -> Option<WindowBounds> {
	let window = find_window(app_name)?;
	Some(WindowBounds {
		width: window.width().ok()?,
		height: window.height().ok()?,
	})
}

/// Capture one region of the game window. `None` when the window is gone or
/// the region does not fit inside the captured image.
pub fn capture_region(app_name: &str, region: Region) -> Option<RgbaImage> {
	let window = find_window(app_name)?;
	let img = window.capture_image().ok()?;

	let right = region.x.checked_add(region.width)?;
	let bottom = region.y.checked_add(region.height)?;
	if right > img.width() || bottom > img.height() || region.width == 0 || region.height == 0 {
		return None;
	}

	Some(
		xcap::image::imageops::crop_imm(&img, region.x, region.y, region.width, region.height)
			.to_image(),
	)
}

/// Center dialogue popup ("no branches left...").
pub fn popup_region(bounds: WindowBounds) -> Region {
	let cx = bounds.width / 2;
	let cy = bounds.height / 2;
	Region {
		x: cx.saturating_sub(210),
		y: cy.saturating_sub(70),
		width: 420,
		height: 140,
	}
}

/// Area-name banner below the top-left interface edge.
pub fn banner_region(_bounds: WindowBounds) -> Region {
	Region {
		x: 70,
		y: 50,
		width: 360,
		height: 90,
	}
}

/// Minimap area label, anchored to the top-right corner.
pub fn minimap_region(bounds: WindowBounds) -> Region {
	Region {
		x: bounds.width.saturating_sub(330),
		y: 70,
		width: 320,
		height: 110,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn regions_track_window_geometry() {
		let bounds = WindowBounds {
			width: 1920,
			height: 1080,
		};
		let popup = popup_region(bounds);
		assert_eq!((popup.x, popup.y), (750, 470));

		let minimap = minimap_region(bounds);
		assert_eq!(minimap.x, 1590);
	}

	#[test]
	fn tiny_windows_do_not_underflow() {
		let bounds = WindowBounds {
			width: 100,
			height: 80,
		};
		let popup = popup_region(bounds);
		assert_eq!((popup.x, popup.y), (0, 0));
		assert_eq!(minimap_region(bounds).x, 0);
	}
}
