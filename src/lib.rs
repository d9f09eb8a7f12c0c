//! # Stackboard
//!
//! A visual builder for cloud infrastructure: arrange externally-managed
//! items (databases, instances, storage buckets) on an infinite canvas,
//! cluster them into colored groups, wire them together, and have every
//! change mirrored to a persistence endpoint without blocking the UI.
//!
//! ## Features
//! - Toolkit of unplaced items with drag reordering and drag-to-place
//! - Group clustering with column layout and live drop highlighting
//! - Connections between item cards via connector handles
//! - Canvas panning and cursor-anchored zooming
//! - Debounced, fire-and-forget persistence of the minimal board projection

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod drag;
pub mod graph;
pub mod registry;
pub mod samples;
pub mod sync;
pub mod types;
mod ui;

pub use ui::BoardApp;

/// Runs the board application with default settings.
///
/// This function initializes the egui application window and starts the
/// main event loop, restoring UI preferences from storage when available.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an
/// `eframe::Error` if initialization fails.
///
/// # Example
///
/// ```no_run
/// use stackboard::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Stackboard",
        options,
        Box::new(|cc| {
            let app = cc
                .storage
                .and_then(|storage| storage.get_string("app_state"))
                .and_then(|json| BoardApp::from_json(&json).ok())
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}
