//! Narrow-screen presentation: a bottom sheet with tabs.
//!
//! Renders the same sections as the desktop panels from the same state.

use super::{layers_panel, search_panel};
use crate::state::{AppState, MobileTab};
use eframe::egui::{self, RichText};
use egui_phosphor::regular as icons;

pub fn render_mobile_sheet(ctx: &egui::Context, state: &mut AppState) {
    let height = if state.layout.sheet_open {
        ctx.content_rect().height() * 0.5
    } else {
        44.0
    };

    egui::TopBottomPanel::bottom("mobile_sheet")
        .exact_height(height)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let arrow = if state.layout.sheet_open {
                    icons::CARET_DOWN
                } else {
                    icons::CARET_UP
                };
                if ui.button(arrow).clicked() {
                    state.layout.sheet_open = !state.layout.sheet_open;
                }

                for tab in MobileTab::all() {
                    let label = match tab {
                        MobileTab::Search => {
                            format!("{} ({})", tab.label(), state.selection.result_count)
                        }
                        MobileTab::Layers => {
                            format!("{} ({})", tab.label(), state.selection.active_layers.len())
                        }
                        MobileTab::Legend => tab.label().to_string(),
                    };
                    let selected = state.layout.mobile_tab == *tab;
                    if ui.selectable_label(selected, RichText::new(label)).clicked() {
                        state.layout.mobile_tab = *tab;
                        state.layout.sheet_open = true;
                    }
                }
            });

            if !state.layout.sheet_open {
                return;
            }
            ui.separator();

            match state.layout.mobile_tab {
                MobileTab::Search => search_panel::render_search_section(ui, state),
                MobileTab::Layers => {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        layers_panel::render_base_layer_section(ui, state);
                        layers_panel::render_active_layers_section(ui, state);
                    });
                }
                MobileTab::Legend => {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        layers_panel::render_legend_section(ui, state);
                    });
                }
            }
        });
}
