//! Elder tree tracker.
//!
//! Hosts the egui panel and orchestrates background recognition polling.

mod app;
mod capture;
mod config;
mod host;
mod poll;

fn main() -> eframe::Result {
	// Structured logging. Use `RUST_LOG=info` etc.
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let options = eframe::NativeOptions {
		viewport: egui::ViewportBuilder::default().with_inner_size([540.0, 680.0]),
		..Default::default()
	};

	eframe::run_native(
		"Elder Tracker",
		options,
		Box::new(|cc| Ok(Box::new(app::App::new(cc)))),
	)
}
