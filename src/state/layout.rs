//! Responsive layout selection.

/// Widths at or below this many points use the mobile presentation.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

/// Tabs of the mobile bottom sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MobileTab {
    #[default]
    Search,
    Layers,
    Legend,
}

impl MobileTab {
    pub fn all() -> &'static [MobileTab] {
        &[MobileTab::Search, MobileTab::Layers, MobileTab::Legend]
    }

    pub fn label(self) -> &'static str {
        match self {
            MobileTab::Search => "Search",
            MobileTab::Layers => "Layers",
            MobileTab::Legend => "Legend",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    pub is_mobile: bool,
    pub mobile_tab: MobileTab,
    /// Bottom sheet expanded on mobile.
    pub sheet_open: bool,
    /// Legend side panel shown on desktop.
    pub legend_open: bool,
}

impl LayoutState {
    /// Re-evaluates the layout for a new screen width.
    pub fn update_for_width(&mut self, width: f32) {
        let mobile = width <= MOBILE_BREAKPOINT;
        if mobile != self.is_mobile {
            log::debug!("Switching to {} layout", if mobile { "mobile" } else { "desktop" });
            self.is_mobile = mobile;
        }
    }
}
