//! Top bar UI: app title, search shortcuts, and status.

use super::colors;
use crate::state::{AppState, SearchStatus, UiAction};
use eframe::egui::{self, Color32, RichText};
use egui_phosphor::regular as icons;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Geological Map Viewer")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                let busy = state.search.is_searching() || state.cache.is_fetching();
                ui.add_enabled_ui(!state.search.is_searching(), |ui| {
                    if ui
                        .button(icons::MAGNIFYING_GLASS)
                        .on_hover_text("Search this area")
                        .clicked()
                    {
                        state.actions.push(UiAction::Search);
                    }
                    let refresh_hint = if state.cache.is_empty() {
                        "Load the catalog".to_string()
                    } else {
                        format!("Reload the catalog ({} maps cached)", state.cache.len())
                    };
                    if ui
                        .button(icons::ARROWS_CLOCKWISE)
                        .on_hover_text(refresh_hint)
                        .clicked()
                    {
                        state.actions.push(UiAction::RefreshCatalog);
                    }
                });

                ui.separator();

                if busy {
                    ui.spinner();
                }

                let failed = state.notice.is_some()
                    || matches!(state.search.status(), SearchStatus::Failed(_));
                let color = if failed {
                    colors::ui::ERROR
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(state.status_line()).size(13.0).color(color));

                if state.notice.is_some()
                    && ui.small_button(icons::X).on_hover_text("Dismiss").clicked()
                {
                    state.actions.push(UiAction::DismissNotice);
                }
            });
        });
}
