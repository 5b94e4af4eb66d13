//! Central canvas UI: the slippy map with its overlay layers.

use super::colors;
use crate::geo::GeoBounds;
use crate::state::AppState;
use eframe::egui::{self, Align2, FontId, Pos2, Rect, RichText, Stroke, Vec2};
use egui_phosphor::regular as icons;
use std::cell::Cell;
use walkers::{lon_lat, MapMemory, Plugin, Projector};

/// Draws the hover preview and layer labels, and reports what the frame covered.
struct AnnotationPlugin<'a> {
    preview: Option<GeoBounds>,
    labels: Vec<(GeoBounds, String)>,
    viewport: &'a Cell<Option<GeoBounds>>,
}

impl Plugin for AnnotationPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let rect = response.rect;
        let nw = projector.unproject(rect.left_top().to_vec2());
        let se = projector.unproject(rect.right_bottom().to_vec2());
        self.viewport
            .set(GeoBounds::new(nw.x(), se.y(), se.x(), nw.y()));

        let painter = ui.painter().with_clip_rect(rect);
        let to_screen = |bounds: &GeoBounds| {
            let nw = projector.project(lon_lat(bounds.west, bounds.north));
            let se = projector.project(lon_lat(bounds.east, bounds.south));
            Rect::from_min_max(Pos2::new(nw.x, nw.y), Pos2::new(se.x, se.y))
        };

        for (bounds, title) in &self.labels {
            painter.text(
                to_screen(bounds).left_top() + Vec2::new(4.0, 4.0),
                Align2::LEFT_TOP,
                title,
                FontId::proportional(11.0),
                colors::map::LABEL,
            );
        }

        if let Some(bounds) = &self.preview {
            let r = to_screen(bounds);
            let corners = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
            painter.extend(egui::Shape::dashed_line(
                &corners,
                Stroke::new(2.0, colors::map::PREVIEW),
                8.0,
                5.0,
            ));
        }
    }
}

pub fn render_canvas(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(colors::map::BACKGROUND))
        .show(ctx, |ui| {
            let preview = state
                .hovered_result
                .as_deref()
                .and_then(|id| state.search.find(id))
                .map(|c| c.bounds);
            let labels = state
                .overlays
                .entries()
                .map(|entry| {
                    let title = crate::overlay::truncate_title(&entry.data.display_title, 30);
                    (entry.data.bounds, title)
                })
                .collect();

            let viewport = Cell::new(None);
            let response = state.map.show(
                ui,
                AnnotationPlugin {
                    preview,
                    labels,
                    viewport: &viewport,
                },
            );
            if let Some(bounds) = viewport.get() {
                state.map.record_viewport(bounds);
            }

            draw_overlay_info(ui, &response.rect, state);
        });
}

fn draw_overlay_info(ui: &mut egui::Ui, rect: &Rect, state: &mut AppState) {
    let overlay_pos = rect.left_top() + Vec2::new(10.0, 10.0);
    let overlay_rect = Rect::from_min_size(overlay_pos, Vec2::new(220.0, 80.0));

    let zoom = state.map.zoom();
    let center = state.map.center();
    let drawn = state.map.overlays().filter(|o| o.visible_at(zoom)).count();
    let upscaled = state
        .map
        .overlays()
        .filter(|o| o.visible_at(zoom) && o.upscaled_at(zoom))
        .count();

    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
        ui.vertical(|ui| {
            ui.label(
                RichText::new(format!("{:.4}°N {:.4}°E", center.y(), center.x()))
                    .monospace()
                    .size(12.0)
                    .color(colors::map::LABEL),
            );
            let layers = if upscaled > 0 {
                format!("Zoom {:.1} · {} layers ({} upscaled)", zoom, drawn, upscaled)
            } else {
                format!("Zoom {:.1} · {} layers", zoom, drawn)
            };
            ui.label(
                RichText::new(layers)
                    .monospace()
                    .size(11.0)
                    .color(colors::ui::VALUE),
            );
            if ui
                .small_button(format!("{} Reset view", icons::HOUSE))
                .clicked()
            {
                state.map.reset();
            }
        });
    });
}
