//! Centralized color constants for the UI.
//!
//! This module provides consistent colors across all UI panels.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for secondary labels.
    pub const LABEL: Color32 = Color32::from_rgb(120, 120, 120);
    /// Slightly brighter for values.
    pub const VALUE: Color32 = Color32::from_rgb(160, 160, 160);
    /// Emphasized color for selected items.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
    /// Dim text color for placeholders.
    pub const DIM: Color32 = Color32::from_rgb(120, 120, 130);
    /// Background of a selected result row.
    pub const SELECTED_FILL: Color32 = Color32::from_rgb(30, 50, 75);
    /// Status line when something went wrong.
    pub const ERROR: Color32 = Color32::from_rgb(255, 110, 100);
}

/// Colors for the map canvas.
pub mod map {
    use super::Color32;

    pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
    pub const LABEL: Color32 = Color32::from_rgb(220, 220, 240);
    /// Dashed outline for the hovered result.
    pub const PREVIEW: Color32 = Color32::from_rgb(255, 200, 60);
}
