mod brush;

use std::time::Instant;

use anyhow::Context;
use brush::{tile_at, Brush};
use eframe::egui;
use eframe::egui::{ScrollArea, Ui};
use eframe::run_native;
use life::{Grid, GridSimulation, Pattern, SimulationConfig, PATTERNS};
use log::{debug, warn};

const CELL_SIZE: f32 = 20.0;
const CELL_ROUNDING: f32 = CELL_SIZE / 4f32;
const CONTROLS_HEIGHT: f32 = 140.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = SimulationConfig::default();
    let simulation = GridSimulation::from_config(&config).context("create simulation")?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([
            CELL_SIZE * config.width as f32 + 32.0,
            CELL_SIZE * config.height as f32 + CONTROLS_HEIGHT,
        ]),
        ..Default::default()
    };

    run_native(
        "Game of Life",
        options,
        Box::new(|cc| Ok(Box::new(GuiOfLife::new(cc, simulation)))),
    )
    .map_err(|err| anyhow::anyhow!("run game of life window: {err}"))
}

/// Plain unsigned integers parse; zero is left for the simulation to reject.
fn parse_tick_input(input: &str) -> Option<u64> {
    input.trim().parse().ok()
}

fn centered_origin(grid: &Grid, pattern: &Pattern) -> (usize, usize) {
    let (pattern_width, pattern_height) = pattern.size();
    (
        grid.width().saturating_sub(pattern_width) / 2,
        grid.height().saturating_sub(pattern_height) / 2,
    )
}

struct GuiOfLife {
    simulation: GridSimulation,
    brush: Brush,
    last_frame: Instant,
    tick_input: String,
    selected_pattern: usize,
}

impl GuiOfLife {
    fn new(cc: &eframe::CreationContext<'_>, mut simulation: GridSimulation) -> Self {
        // Changes to the board wake the UI up; no polling while idle.
        let ctx = cc.egui_ctx.clone();
        simulation.set_render_hook(move |_| ctx.request_repaint());

        let tick_input = simulation.tick_interval().as_millis().to_string();
        Self {
            simulation,
            brush: Brush::default(),
            last_frame: Instant::now(),
            tick_input,
            selected_pattern: 0,
        }
    }

    fn apply_tick_input(&mut self) {
        let Some(ms) = parse_tick_input(&self.tick_input) else {
            debug!("ignoring tick speed {:?}", self.tick_input);
            return;
        };
        if let Err(err) = self.simulation.set_tick_interval(ms) {
            warn!("rejected tick speed: {err}");
        }
    }

    fn apply_selected_pattern(&mut self) {
        let pattern = &PATTERNS[self.selected_pattern];
        let origin = centered_origin(self.simulation.grid(), pattern);
        if let Err(err) = self.simulation.apply_pattern(pattern, origin) {
            warn!("cannot place {}: {err}", pattern.name);
        }
    }

    fn create_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let label = if self.simulation.is_running() { "Pause" } else { "Play" };
            if ui.button(label).clicked() {
                self.simulation.toggle_running();
            }
            if ui.button("Next").clicked() {
                self.simulation.step();
            }
            if ui.button("Clear").clicked() {
                self.simulation.clear();
            }
            if ui.button("Randomize").clicked() {
                self.simulation.randomize();
            }

            ui.separator();
            ui.label("Tick Speed (ms):");
            let response = ui.add(egui::TextEdit::singleline(&mut self.tick_input).desired_width(60.0));
            if response.changed() {
                self.apply_tick_input();
            }
        });

        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Pattern")
                .selected_text(PATTERNS[self.selected_pattern].name)
                .show_ui(ui, |ui| {
                    for (index, pattern) in PATTERNS.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_pattern, index, pattern.name);
                    }
                });
            if ui.button("Apply").clicked() {
                self.apply_selected_pattern();
            }

            ui.separator();
            ui.label(format!("Generation: {}", self.simulation.generation()));
            ui.label(format!("Live cells: {}", self.simulation.grid().alive_count()));
        });
    }

    fn create_grid(&mut self, ui: &mut Ui) {
        let (columns, rows) = (self.simulation.grid().width(), self.simulation.grid().height());

        let (response, painter) = ui.allocate_painter(
            egui::vec2(CELL_SIZE * columns as f32, CELL_SIZE * rows as f32),
            egui::Sense::click_and_drag(),
        );
        let origin = response.rect.min;

        if response.is_pointer_button_down_on() {
            let tile = response
                .interact_pointer_pos()
                .and_then(|pos| tile_at(origin, pos, CELL_SIZE, columns, rows));
            if let Some((x, y)) = tile {
                if self.brush.paint((x, y)) {
                    if let Err(err) = self.simulation.toggle_cell(x, y) {
                        warn!("{err}");
                    }
                }
            }
        } else {
            self.brush.release();
        }

        for cell in self.simulation.grid().cells() {
            let pos = origin + egui::vec2(cell.x as f32 * CELL_SIZE, cell.y as f32 * CELL_SIZE);
            let color = if cell.alive {
                egui::Color32::WHITE
            } else {
                egui::Color32::DARK_GRAY
            };
            painter.rect_filled(
                egui::Rect::from_min_size(pos, egui::vec2(CELL_SIZE, CELL_SIZE)).shrink(0.5),
                CELL_ROUNDING,
                color,
            );
        }
    }
}

impl eframe::App for GuiOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.simulation.advance(now - self.last_frame);
        self.last_frame = now;

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::both().show(ui, |ui| {
                ui.heading("Game of Life");
                self.create_controls(ui);
                ui.separator();
                self.create_grid(ui);
            });
        });

        if self.simulation.is_running() {
            ctx.request_repaint_after(self.simulation.tick_interval());
        }
    }
}
