//! Interactive molecule collision viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a running
//! [`Simulation`] and implements [`eframe::App`] to draw the arena and
//! translate keyboard and mouse input into simulation commands.

use eframe::App;
use glam::DVec3;
use molsim_core::{MoleculeKind, RenderItem, Simulation};

/// Arena background colour.
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(50, 204, 255);

/// A user action forwarded to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add one N2 and one O2 molecule at rest.
    AddPair,
    /// Remove the two most recently added molecules.
    RemovePair,
    /// Double the velocity of energy-sensitive molecules.
    Heat,
    /// Halve the velocity of energy-sensitive molecules.
    Cool,
}

impl Command {
    /// Keyboard shortcuts; `=` doubles as `+` on layouts without a plus key.
    pub const KEY_BINDINGS: [(egui::Key, Command); 5] = [
        (egui::Key::Plus, Command::AddPair),
        (egui::Key::Equals, Command::AddPair),
        (egui::Key::Minus, Command::RemovePair),
        (egui::Key::H, Command::Heat),
        (egui::Key::C, Command::Cool),
    ];

    pub fn from_key(key: egui::Key) -> Option<Command> {
        Self::KEY_BINDINGS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, c)| *c)
    }
}

/// Frame and collision rates, refreshed once per second.
#[derive(Debug, Default)]
pub struct RateMeter {
    frames: u32,
    window_start: f64,
    pub fps: u32,
    pub collisions_per_sec: u64,
}

impl RateMeter {
    /// Counts one frame at time `now` (seconds).
    ///
    /// When a second or more has passed since the last refresh, the frame
    /// count becomes the new FPS value and `collisions` is called to fetch
    /// the collisions of that window.
    ///
    /// ### Returns
    /// `true` if the rates were refreshed.
    pub fn frame(&mut self, now: f64, collisions: impl FnOnce() -> u64) -> bool {
        self.frames += 1;
        if now - self.window_start < 1.0 {
            return false;
        }
        self.fps = self.frames;
        self.collisions_per_sec = collisions();
        self.frames = 0;
        self.window_start = now;
        true
    }
}

/// Builds the status line shown under the arena.
pub fn status_text(fps: u32, molecules: usize, collisions_per_sec: u64) -> String {
    format!("FPS: {fps} | Molecules: {molecules} | Collisions/sec: {collisions_per_sec}")
}

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: a started [`Simulation`].
/// - UI state (molecule kind placed on click, rate meter).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Translate pressed keys and clicks into simulation commands.
/// 2. Draw every molecule through [`Simulation::for_each_visual`].
/// 3. Refresh the status line once per second and request a repaint.
///
/// ### Fields
/// - `sim` - The simulation; its engines run on their own threads.
/// - `rng` - Random number generator used for placing new molecules.
/// - `spawn_kind` - Molecule kind added when clicking into the arena.
/// - `rates` - FPS and collisions per second for the status bar.
pub struct Viewer {
    sim: Simulation,
    rng: rand::rngs::ThreadRng,
    spawn_kind: MoleculeKind,
    rates: RateMeter,
}

impl Viewer {
    /// Wraps an already populated and started simulation.
    pub fn new(sim: Simulation) -> Self {
        Self {
            sim,
            rng: rand::rng(),
            spawn_kind: MoleculeKind::N2,
            rates: RateMeter::default(),
        }
    }

    /// Forwards one command to the simulation.
    fn apply(&mut self, command: Command) {
        match command {
            Command::AddPair => {
                self.sim.add_pair(&mut self.rng);
            }
            Command::RemovePair => {
                self.sim.remove_pair();
            }
            Command::Heat => {
                self.sim.heat();
            }
            Command::Cool => {
                self.sim.cool();
            }
        }
    }

    /// Uniform scale that fits the whole arena into `rect`.
    fn scale(&self, rect: egui::Rect) -> f32 {
        let cfg = self.sim.config();
        let sx = rect.width() / cfg.arena_width as f32;
        let sy = rect.height() / cfg.arena_height as f32;
        sx.min(sy).max(f32::EPSILON)
    }

    /// Converts an arena position to screen-space.
    ///
    /// Arena and screen share orientation (y grows downward); the arena's
    /// origin maps to the top-left corner of `rect`.
    fn world_to_screen(&self, p: DVec3, rect: egui::Rect) -> egui::Pos2 {
        let s = self.scale(rect);
        egui::pos2(rect.min.x + p.x as f32 * s, rect.min.y + p.y as f32 * s)
    }

    /// Inverse of [`Viewer::world_to_screen`] (up to floating point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec3 {
        let s = self.scale(rect);
        DVec3::new(
            ((p.x - rect.min.x) / s) as f64,
            ((p.y - rect.min.y) / s) as f64,
            0.0,
        )
    }

    /// Screen rectangle covered by one molecule.
    fn item_rect(&self, item: &RenderItem, rect: egui::Rect) -> egui::Rect {
        let min = self.world_to_screen(item.position, rect);
        let side = (item.size as f32 * self.scale(rect)).max(1.0);
        egui::Rect::from_min_size(min, egui::vec2(side, side))
    }

    /// Builds the top panel with one button per command.
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut clicked = None;
                if ui.button("+ Add pair").clicked() {
                    clicked = Some(Command::AddPair);
                }
                if ui.button("− Remove pair").clicked() {
                    clicked = Some(Command::RemovePair);
                }
                ui.separator();
                if ui.button("🔥 Heat").clicked() {
                    clicked = Some(Command::Heat);
                }
                if ui.button("❄ Cool").clicked() {
                    clicked = Some(Command::Cool);
                }
                if let Some(command) = clicked {
                    self.apply(command);
                }
            });
        });
    }

    /// Builds the bottom status bar (frame rate, molecule count, collision rate).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(status_text(
                    self.rates.fps,
                    self.sim.particle_count(),
                    self.rates.collisions_per_sec,
                ));
            });
        });
    }

    /// Builds the small floating toolbar for choosing the kind placed on click.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        egui::Area::new("toolbar".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 40.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            for kind in MoleculeKind::ALL {
                                if ui
                                    .selectable_label(self.spawn_kind == kind, kind.name())
                                    .clicked()
                                {
                                    self.spawn_kind = kind;
                                }
                            }
                        });
                    });
            });
    }

    /// Builds the central panel where the arena is drawn and clicked.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Click places a molecule of the selected kind, at rest.
            if response.clicked()
                && let Some(pos) = response.interact_pointer_pos()
            {
                let world = self.screen_to_world(pos, rect);
                self.sim.add_particle(self.spawn_kind, world, DVec3::ZERO);
            }

            let cfg = self.sim.config();
            let arena = egui::Rect::from_min_max(
                rect.min,
                self.world_to_screen(DVec3::new(cfg.arena_width, cfg.arena_height, 0.0), rect),
            );
            painter.rect_filled(arena, egui::CornerRadius::ZERO, BACKGROUND);

            self.sim.for_each_visual(|item| {
                let [r, g, b, a] = item.color.to_array();
                painter.rect_filled(
                    self.item_rect(&item, rect),
                    egui::CornerRadius::ZERO,
                    egui::Color32::from_rgba_unmultiplied(r, g, b, a),
                );
            });
        });
    }
}

impl App for Viewer {
    /// eframe callback that handles input and builds all panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let pressed: Vec<Command> = ctx.input(|i| {
            Command::KEY_BINDINGS
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, command)| *command)
                .collect()
        });
        for command in pressed {
            self.apply(command);
        }

        let now = ctx.input(|i| i.time);
        let sim = &self.sim;
        self.rates.frame(now, || sim.collisions_since_last_call());

        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);

        ctx.request_repaint_after(self.sim.config().frame_interval());
    }
}
