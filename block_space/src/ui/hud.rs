//! HUD overlay: latest block, navigation state, gaze and selection, FPS.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::navigation::{NavigationState, Phase};
use crate::picking::{GazeState, Selection};
use crate::scene::{BlockRegistry, MAX_BLOCKS};

pub fn hud_plugin(app: &mut App) {
    app.add_plugins(EguiPlugin)
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_systems(Update, hud_overlay_system);
}

fn hud_overlay_system(
    mut contexts: EguiContexts,
    registry: Res<BlockRegistry>,
    nav: Res<NavigationState>,
    gaze: Res<GazeState>,
    selection: Res<Selection>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);

    egui::Window::new("Strata")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 210))
                .inner_margin(egui::Margin::same(12))
                .corner_radius(egui::CornerRadius::same(6)),
        )
        .show(contexts.ctx_mut(), |ui| {
            ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(200, 220, 240));

            match registry.latest() {
                Some((number, entry)) => {
                    ui.label(
                        egui::RichText::new(format!("Block #{number}"))
                            .size(16.0)
                            .color(egui::Color32::from_rgb(100, 220, 180)),
                    );
                    ui.label(format!("Txns {}", entry.tx_count));
                    ui.label(format!("Time {}", format_timestamp(entry.timestamp)));
                }
                None => {
                    ui.label("Waiting for blocks…");
                }
            }
            ui.add_space(4.0);

            ui.separator();
            ui.label(format!("Nav  {}", phase_label(nav.phase())));
            ui.label(format!("Offset  {}", format_offset(nav.offset)));
            ui.label(format!("Looking at  {}", format_block(gaze.looked_at())));

            if let Some(number) = selection.selected() {
                ui.add_space(4.0);
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("Selected #{number}"))
                        .color(egui::Color32::from_rgb(255, 200, 90)),
                );
                if let Some(entry) = registry.get(number) {
                    ui.label(format!("Txns {}", entry.tx_count));
                    ui.label(format!("Time {}", format_timestamp(entry.timestamp)));
                    if let Some(hash) = &entry.hash {
                        ui.label(format!("Hash {}", abbreviate(hash)));
                    }
                }
                ui.label("Esc to dismiss");
            }

            ui.add_space(4.0);
            ui.separator();
            ui.label(format!("Blocks shown  {}/{MAX_BLOCKS}", registry.len()));
            ui.label(format!("FPS  {fps:.0}"));
        });
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Active => "dragging",
        Phase::Decelerating => "coasting",
    }
}

fn format_block(number: Option<u64>) -> String {
    number.map_or_else(|| "-".to_string(), |n| format!("#{n}"))
}

fn format_offset(offset: Vec3) -> String {
    format!("{:+.3} {:+.3} {:+.3}", offset.x, offset.y, offset.z)
}

fn abbreviate(hash: &str) -> String {
    let count = hash.chars().count();
    if count <= 14 {
        return hash.to_string();
    }
    let head: String = hash.chars().take(8).collect();
    let tail: String = hash.chars().skip(count - 4).collect();
    format!("{head}..{tail}")
}

fn format_timestamp(ts: u64) -> String {
    let secs = ts % 60;
    let mins = (ts / 60) % 60;
    let hours = (ts / 3600) % 24;
    format!("{hours:02}:{mins:02}:{secs:02} UTC")
}
