//! Right panel UI: base layer, active overlays and the legend.

use super::colors;
use crate::overlay::{LegendImage, LegendView};
use crate::state::{AppState, UiAction};
use eframe::egui::{self, RichText, ScrollArea};
use egui_phosphor::regular as icons;

pub fn render_layers_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(280.0)
        .min_width(220.0)
        .max_width(420.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(format!("{} Layers", icons::STACK));
                ui.separator();

                render_base_layer_section(ui, state);
                ui.add_space(5.0);

                render_active_layers_section(ui, state);

                if state.layout.legend_open {
                    ui.add_space(5.0);
                    egui::CollapsingHeader::new(RichText::new("Legend").strong())
                        .default_open(true)
                        .show(ui, |ui| render_legend_section(ui, state));
                }
            });
        });
}

pub(super) fn render_base_layer_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Base layer").strong())
        .default_open(true)
        .show(ui, |ui| {
            let mut visible = state.seamless.is_visible();
            if ui
                .checkbox(&mut visible, "Seamless geological map")
                .changed()
            {
                state.actions.push(UiAction::SetSeamlessVisible(visible));
            }

            let mut opacity = state.seamless.opacity() * 100.0;
            if ui
                .add(egui::Slider::new(&mut opacity, 0.0..=100.0).suffix("%").text("Opacity"))
                .changed()
            {
                state.actions.push(UiAction::SetSeamlessOpacity(opacity / 100.0));
            }
        });
}

pub(super) fn render_active_layers_section(ui: &mut egui::Ui, state: &mut AppState) {
    let count = state.selection.active_layers.len();
    egui::CollapsingHeader::new(RichText::new(format!("Active layers ({})", count)).strong())
        .default_open(true)
        .show(ui, |ui| {
            if count == 0 {
                ui.label(
                    RichText::new("Select a map from the results to show it here")
                        .italics()
                        .color(colors::ui::DIM),
                );
                return;
            }

            for row in &state.selection.active_layers {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&row.title).strong())
                            .on_hover_text(&row.full_title);
                    });
                    ui.horizontal(|ui| {
                        if ui
                            .button(icons::MAGNIFYING_GLASS_PLUS)
                            .on_hover_text("Zoom to layer")
                            .clicked()
                        {
                            state.actions.push(UiAction::ZoomTo(row.id.clone()));
                        }
                        if ui.button(icons::LIST_BULLETS).on_hover_text("Show legend").clicked() {
                            state.actions.push(UiAction::ShowLegend(row.id.clone()));
                        }
                        if ui.button(icons::TRASH).on_hover_text("Remove").clicked() {
                            state.actions.push(UiAction::Remove(row.id.clone()));
                        }
                    });

                    let current = state.overlays.opacity(&row.id, &state.map).unwrap_or(0.0);
                    let mut percent = current * 100.0;
                    if ui
                        .add(egui::Slider::new(&mut percent, 0.0..=100.0).suffix("%").text("Opacity"))
                        .changed()
                    {
                        state
                            .actions
                            .push(UiAction::SetOpacity(row.id.clone(), percent / 100.0));
                    }
                });
            }
        });
}

pub(super) fn render_legend_section(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(legend) = &state.legend else {
        ui.label(
            RichText::new("Choose a layer's legend button to see it here")
                .italics()
                .color(colors::ui::DIM),
        );
        return;
    };

    ui.horizontal(|ui| {
        ui.label(RichText::new(&legend.title).strong().size(14.0))
            .on_hover_text(&legend.full_title);
        if ui.small_button(icons::X).on_hover_text("Close").clicked() {
            state.actions.push(UiAction::CloseLegend);
        }
    });
    ui.separator();

    render_legend_body(ui, legend, &mut state.actions);
}

fn render_legend_body(ui: &mut egui::Ui, legend: &LegendView, actions: &mut Vec<UiAction>) {
    if let Some(citation) = &legend.citation {
        ui.label(RichText::new("Citation").small().color(colors::ui::LABEL));
        ui.horizontal_wrapped(|ui| {
            ui.label(citation);
            if ui.small_button(icons::COPY).on_hover_text("Copy").clicked() {
                actions.push(UiAction::CopyText(citation.clone()));
            }
        });
        ui.add_space(4.0);
    }

    if legend.unavailable {
        ui.label(
            RichText::new("No legend data is available for this map.")
                .italics()
                .color(colors::ui::DIM),
        );
    }

    for link in &legend.links {
        ui.hyperlink_to(link.kind.label(), &link.url);
    }

    if let Some(image) = &legend.image {
        ui.add_space(4.0);
        let label = match image {
            LegendImage::Legend(_) => format!("{} Legend image", icons::IMAGE),
            LegendImage::MapImage(_) => format!("{} Published map image", icons::IMAGE),
        };
        ui.hyperlink_to(label, image.url());
    }
}
