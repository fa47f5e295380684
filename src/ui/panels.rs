use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::ui::state::{RoseStats, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub regrow: bool,
    pub toggle_music: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: &RoseStats,
    last_error: &Option<String>,
    music_glyph: &str,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("rose_panel")
        .min_width(240.0)
        .max_width(320.0)
        .default_width(260.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("Happy Rose Day").color(ACCENT_CRIMSON).strong());
                ui.add_space(2.0);
                ui.label(RichText::new("Move the pointer or drag to turn the rose").color(TEXT_MUTED).size(11.0));
                ui.add_space(14.0);

                ui.horizontal(|ui| {
                    if ui.add(egui::Button::new(RichText::new("Regrow").color(Color32::WHITE))
                        .fill(ACCENT_ROSE).min_size(egui::vec2(110.0, 32.0))).clicked() {
                        actions.regrow = true;
                    }
                    if ui.add(egui::Button::new(RichText::new(music_glyph).size(16.0))
                        .min_size(egui::vec2(44.0, 32.0)))
                        .on_hover_text("Music")
                        .clicked() {
                        actions.toggle_music = true;
                    }
                });

                if let Some(err) = last_error {
                    ui.add_space(8.0);
                    error_box(ui, err);
                }

                ui.add_space(16.0);
                ui.separator();
                ui.add_space(12.0);

                stats_panel(ui, stats);
                ui.add_space(16.0);

                perf_controls(ui, state);
                ui.add_space(12.0);
                ui.checkbox(&mut state.show_help, "Show key help");
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn error_box(ui: &mut Ui, err: &str) {
    egui::Frame::default()
        .fill(Color32::from_rgb(255, 228, 230))
        .stroke(egui::Stroke::new(1.0, ACCENT_ERROR))
        .rounding(6.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(err).color(ACCENT_ERROR).size(11.0));
        });
}

fn perf_controls(ui: &mut Ui, state: &mut UiState) {
    section_header(ui, "PERFORMANCE");
    ui.checkbox(&mut state.vsync_enabled, "VSync");
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.fps_cap_enabled, "FPS Cap:");
        ui.add_enabled(state.fps_cap_enabled,
            egui::DragValue::new(&mut state.fps_cap).range(15..=240).suffix(" fps"));
    });
}

fn stats_panel(ui: &mut Ui, stats: &RoseStats) {
    section_header(ui, "ROSE");
    egui::Frame::default()
        .fill(BG_BLUSH)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(8.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 55.0 { ACCENT_LEAF } else { ACCENT_CRIMSON };

            egui::Grid::new("rose_stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                row(ui, "FPS", format!("{:.0}", stats.fps), fps_color);
                row(ui, "Petals", stats.petals.to_string(), ACCENT_ROSE);
                row(ui, "Sepals", stats.sepals.to_string(), ACCENT_LEAF);
                row(ui, "Vertices", fmt_num(stats.vertices), TEXT_PRIMARY);
                row(ui, "Triangles", fmt_num(stats.triangles), TEXT_PRIMARY);
                row(ui, "Pointer", format!("{:+.2} {:+.2}", stats.pointer[0], stats.pointer[1]), TEXT_PRIMARY);
                row(ui, "Pitch/Yaw", format!("{:.2} {:.2}", stats.rotation[0], stats.rotation[1]), TEXT_PRIMARY);
                if stats.dropped_events > 0 {
                    row(ui, "Dropped", stats.dropped_events.to_string(), ACCENT_CRIMSON);
                }
            });

            if !stats.gpu_available {
                ui.add_space(6.0);
                ui.label(RichText::new("No GPU: 3D view disabled").color(ACCENT_ERROR));
            }
        });
}

fn row(ui: &mut Ui, label: &str, value: String, color: Color32) {
    ui.label(RichText::new(label).color(TEXT_MUTED));
    ui.label(RichText::new(value).color(color));
    ui.end_row();
}

pub fn draw_help_overlay(ctx: &Context) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_rgba_unmultiplied(255, 240, 245, 210))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("Pointer/Touch - Turn | R - Regrow | M - Music").color(TEXT_MUTED));
                    ui.label(RichText::new("H - Panel | Esc - Quit").color(TEXT_MUTED));
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}
