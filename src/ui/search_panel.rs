//! Left panel UI: search controls and the result list.

use super::colors;
use crate::overlay::{ResultLayout, ResultRow};
use crate::state::{AppState, UiAction};
use eframe::egui::{self, RichText, ScrollArea};
use egui_phosphor::regular as icons;

pub fn render_search_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::left("search_panel")
        .resizable(true)
        .default_width(300.0)
        .min_width(240.0)
        .max_width(460.0)
        .show(ctx, |ui| {
            ui.heading(format!("{} Search", icons::MAGNIFYING_GLASS));
            ui.separator();
            render_search_section(ui, state);
        });
}

/// Search button, result count and the result list. Shared with the
/// mobile sheet.
pub(super) fn render_search_section(ui: &mut egui::Ui, state: &mut AppState) {
    let searching = state.search.is_searching();

    ui.horizontal(|ui| {
        ui.add_enabled_ui(!searching, |ui| {
            let label = format!("{} Search this area", icons::MAGNIFYING_GLASS);
            if ui.button(label).clicked() {
                state.actions.push(UiAction::Search);
            }
        });
        if searching {
            ui.spinner();
        }
    });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Results").strong());
        ui.label(
            RichText::new(state.selection.count_label())
                .small()
                .color(colors::ui::LABEL),
        );
    });
    ui.separator();

    let mut hovered = None;
    ScrollArea::vertical()
        .id_salt("result_list")
        .auto_shrink([false, false])
        .show(ui, |ui| match &state.selection.layout {
            ResultLayout::Flat(rows) if rows.is_empty() => {
                ui.label(
                    RichText::new(state.search.status().message())
                        .italics()
                        .color(colors::ui::DIM),
                );
            }
            ResultLayout::Flat(rows) => {
                for row in rows {
                    render_row(ui, row, &mut state.actions, &mut hovered);
                }
            }
            ResultLayout::Grouped(groups) => {
                for group in groups {
                    let mut header = format!("{} ({} maps)", group.category.label(), group.rows.len());
                    if group.selected_count > 0 {
                        header.push_str(&format!("  {} {}", icons::CHECK_CIRCLE, group.selected_count));
                    }
                    egui::CollapsingHeader::new(RichText::new(header).strong())
                        .id_salt(group.category.label())
                        .default_open(group.default_open)
                        .show(ui, |ui| {
                            for row in &group.rows {
                                render_row(ui, row, &mut state.actions, &mut hovered);
                            }
                        });
                }
            }
        });

    state.hovered_result = hovered;
}

fn render_row(
    ui: &mut egui::Ui,
    row: &ResultRow,
    actions: &mut Vec<UiAction>,
    hovered: &mut Option<String>,
) {
    let frame = egui::Frame::group(ui.style()).fill(if row.selected {
        colors::ui::SELECTED_FILL
    } else {
        ui.visuals().faint_bg_color
    });

    let response = frame
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                if row.pending {
                    ui.spinner();
                } else {
                    let icon = if row.selected {
                        icons::CHECK_SQUARE
                    } else {
                        icons::SQUARE
                    };
                    let tooltip = if row.selected { "Remove from map" } else { "Add to map" };
                    if ui.button(icon).on_hover_text(tooltip).clicked() {
                        actions.push(UiAction::Toggle(row.id.clone()));
                    }
                }
                ui.vertical(|ui| {
                    let title = RichText::new(&row.title).strong();
                    let title = if row.selected {
                        title.color(colors::ui::ACTIVE)
                    } else {
                        title
                    };
                    ui.label(title).on_hover_text(&row.full_title);
                    ui.label(RichText::new(&row.extent).small().color(colors::ui::LABEL));
                });
            });
        })
        .response;

    if response.hovered() {
        *hovered = Some(row.id.clone());
    }
}
