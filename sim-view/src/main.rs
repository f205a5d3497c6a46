//! Application entry point for the molecule collision viewer.
//!
//! This binary builds and starts a [`Simulation`], then sets up
//! eframe/egui and delegates all interactive logic and rendering to
//! [`Viewer`] from the `viewer` module.

mod viewer;

use molsim_core::{Config, Simulation};
use viewer::Viewer;

/// Starts the simulation engines and the native eframe application.
///
/// The window is sized to the arena and titled `"Molecule Collisions"`.
/// The engines are stopped and joined when the [`Viewer`] (and with it the
/// [`Simulation`]) is dropped on exit.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the simulation cannot start, or eframe fails to create the
///   native window or event loop.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::default();
    let window = [config.arena_width as f32, config.arena_height as f32 + 60.0];

    let mut sim = Simulation::new(config)?;
    let placed = sim.populate(&mut rand::rng());
    sim.start()?;
    log::info!("started simulation with {placed} molecules");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(window),
        ..Default::default()
    };

    eframe::run_native(
        "Molecule Collisions",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new(sim)))),
    )?;
    Ok(())
}
