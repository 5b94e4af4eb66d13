//! Derives everything the result and layer panels show from the overlay
//! registry and the last rendered result list.
//!
//! [`reconcile`] is a pure function; both the desktop and mobile panels
//! render the same [`SelectionView`], so their badges can never diverge.

use super::registry::{OverlayRegistry, SlotState};
use crate::catalog::MapCandidate;
use std::fmt::Debug;

/// Max title length in the result list.
pub const RESULT_TITLE_CHARS: usize = 50;
/// Max title length in the active layer list.
pub const LAYER_TITLE_CHARS: usize = 40;
/// Results are always listed flat up to this many items.
const FLAT_RESULT_LIMIT: usize = 5;

/// Thematic category of a published map, derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapCategory {
    Quadrangle,
    Volcanic,
    Hydrogeological,
    Surface,
    Marine,
    ActiveFault,
    Environmental,
    Geothermal,
    MineralResources,
    Gravity,
    Other,
}

/// Keyword table in match order; the first category with a hit wins.
const KEYWORDS: &[(MapCategory, &[&str])] = &[
    (MapCategory::Volcanic, &["火山", "volcano", "噴火"]),
    (MapCategory::Hydrogeological, &["水理", "地下水", "帯水層", "水文"]),
    (MapCategory::Surface, &["表層", "土地分類", "地盤"]),
    (MapCategory::Marine, &["海洋", "海底", "沿岸", "海域"]),
    (MapCategory::ActiveFault, &["活断層", "断層"]),
    (MapCategory::Environmental, &["環境"]),
    (MapCategory::Geothermal, &["地熱"]),
    (MapCategory::MineralResources, &["鉱物", "鉱床", "資源"]),
    (MapCategory::Gravity, &["重力"]),
    (MapCategory::Quadrangle, &["地質図幅", "万分の1地質図"]),
];

impl MapCategory {
    /// Order in which category groups are listed.
    pub const DISPLAY_ORDER: [MapCategory; 11] = [
        MapCategory::Quadrangle,
        MapCategory::Volcanic,
        MapCategory::Hydrogeological,
        MapCategory::Surface,
        MapCategory::Marine,
        MapCategory::ActiveFault,
        MapCategory::Environmental,
        MapCategory::Geothermal,
        MapCategory::MineralResources,
        MapCategory::Gravity,
        MapCategory::Other,
    ];

    pub fn classify(title: &str) -> Self {
        let title = title.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| title.contains(&w.to_lowercase())))
            .map_or(MapCategory::Other, |(category, _)| *category)
    }

    pub fn label(self) -> &'static str {
        match self {
            MapCategory::Quadrangle => "Quadrangle maps",
            MapCategory::Volcanic => "Volcanic maps",
            MapCategory::Hydrogeological => "Hydrogeological maps",
            MapCategory::Surface => "Surface geology maps",
            MapCategory::Marine => "Marine geology maps",
            MapCategory::ActiveFault => "Active fault maps",
            MapCategory::Environmental => "Environmental geology maps",
            MapCategory::Geothermal => "Geothermal maps",
            MapCategory::MineralResources => "Mineral resource maps",
            MapCategory::Gravity => "Gravity maps",
            MapCategory::Other => "Other",
        }
    }
}

/// Cuts `text` to `max` characters, appending "..." when shortened.
pub fn truncate_title(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut short: String = text.chars().take(max).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}

/// One search result as listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub id: String,
    pub title: String,
    pub full_title: String,
    pub extent: String,
    pub category: MapCategory,
    pub selected: bool,
    /// The toggle for this row is waiting on a resolution.
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: MapCategory,
    pub rows: Vec<ResultRow>,
    pub selected_count: usize,
    /// Initially open; only the first group is.
    pub default_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultLayout {
    Flat(Vec<ResultRow>),
    Grouped(Vec<CategoryGroup>),
}

/// One shown overlay, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLayerRow {
    pub id: String,
    pub title: String,
    pub full_title: String,
}

/// Derived UI state shared by every presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub result_count: usize,
    pub selected_in_results: usize,
    pub layout: ResultLayout,
    pub active_layers: Vec<ActiveLayerRow>,
}

impl Default for SelectionView {
    fn default() -> Self {
        Self {
            result_count: 0,
            selected_in_results: 0,
            layout: ResultLayout::Flat(Vec::new()),
            active_layers: Vec::new(),
        }
    }
}

impl SelectionView {
    /// Text for the result count badge.
    pub fn count_label(&self) -> String {
        format!("({} maps)", self.result_count)
    }

    pub fn rows(&self) -> Box<dyn Iterator<Item = &ResultRow> + '_> {
        match &self.layout {
            ResultLayout::Flat(rows) => Box::new(rows.iter()),
            ResultLayout::Grouped(groups) => Box::new(groups.iter().flat_map(|g| g.rows.iter())),
        }
    }
}

/// Recomputes the selection view. Call after every registry mutation and
/// every new result list.
pub fn reconcile<H>(registry: &OverlayRegistry<H>, results: &[MapCandidate]) -> SelectionView
where
    H: Clone + PartialEq + Debug,
{
    let rows: Vec<ResultRow> = results
        .iter()
        .map(|c| {
            let slot = registry.state(&c.id);
            ResultRow {
                id: c.id.clone(),
                title: truncate_title(&c.title, RESULT_TITLE_CHARS),
                full_title: c.title.clone(),
                extent: c.bounds.describe(),
                category: MapCategory::classify(&c.title),
                selected: matches!(slot, SlotState::Resolved(_)),
                pending: matches!(slot, SlotState::Resolving),
            }
        })
        .collect();

    let result_count = rows.len();
    let selected_in_results = rows.iter().filter(|r| r.selected).count();

    let mut groups: Vec<CategoryGroup> = MapCategory::DISPLAY_ORDER
        .iter()
        .filter_map(|category| {
            let members: Vec<ResultRow> = rows
                .iter()
                .filter(|r| r.category == *category)
                .cloned()
                .collect();
            (!members.is_empty()).then(|| CategoryGroup {
                category: *category,
                selected_count: members.iter().filter(|r| r.selected).count(),
                rows: members,
                default_open: false,
            })
        })
        .collect();

    let layout = if groups.len() <= 1 || result_count <= FLAT_RESULT_LIMIT {
        ResultLayout::Flat(rows)
    } else {
        if let Some(first) = groups.first_mut() {
            first.default_open = true;
        }
        ResultLayout::Grouped(groups)
    };

    let active_layers = registry
        .entries()
        .map(|e| ActiveLayerRow {
            id: e.id.clone(),
            title: truncate_title(&e.data.candidate.title, LAYER_TITLE_CHARS),
            full_title: e.data.candidate.title.clone(),
        })
        .collect();

    SelectionView {
        result_count,
        selected_in_results,
        layout,
        active_layers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::http::MockFetcher;
    use crate::catalog::TileDescriptorResolver;
    use crate::overlay::registry::{test_candidate, MockWidget, ResolveOutcome, ToggleStep};

    fn titled(id: &str, title: &str) -> MapCandidate {
        let mut c = test_candidate(id, Some("https://t/{z}/{x}/{y}.png"));
        c.title = title.into();
        c
    }

    fn show(registry: &mut OverlayRegistry<u64>, widget: &mut MockWidget, c: &MapCandidate) {
        let data = TileDescriptorResolver::default()
            .finish(c, Default::default())
            .unwrap();
        registry.add(data, widget);
    }

    #[test]
    fn test_first_keyword_match_wins() {
        assert_eq!(MapCategory::classify("富士火山地質図"), MapCategory::Volcanic);
        // Both "地下水" and "環境" appear; hydrogeological is checked first.
        assert_eq!(MapCategory::classify("地下水環境図"), MapCategory::Hydrogeological);
        // "海底" matches marine before the fault keyword is tried.
        assert_eq!(MapCategory::classify("海底活断層図"), MapCategory::Marine);
        assert_eq!(MapCategory::classify("5万分の1地質図幅「東京」"), MapCategory::Quadrangle);
        assert_eq!(MapCategory::classify("Volcano Map"), MapCategory::Volcanic);
        assert_eq!(MapCategory::classify("Bouguer anomaly"), MapCategory::Other);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let long = "地".repeat(45);
        assert_eq!(truncate_title(&long, 50), long);
        let truncated = truncate_title(&long, 40);
        assert_eq!(truncated.chars().count(), 43);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_no_results() {
        let registry: OverlayRegistry<u64> = OverlayRegistry::new(0.7, 18);
        let view = reconcile(&registry, &[]);
        assert_eq!(view.result_count, 0);
        assert_eq!(view.count_label(), "(0 maps)");
        assert_eq!(view.layout, ResultLayout::Flat(Vec::new()));
    }

    #[test]
    fn test_small_result_sets_stay_flat() {
        let registry: OverlayRegistry<u64> = OverlayRegistry::new(0.7, 18);
        let results = vec![titled("a", "火山地質図"), titled("b", "重力図")];
        let view = reconcile(&registry, &results);
        assert!(matches!(view.layout, ResultLayout::Flat(ref rows) if rows.len() == 2));
    }

    #[test]
    fn test_groups_follow_display_order_with_badges() {
        let mut registry = OverlayRegistry::new(0.7, 18);
        let mut widget = MockWidget::default();
        let results = vec![
            titled("v1", "火山地質図 1"),
            titled("g1", "重力図"),
            titled("q1", "地質図幅 A"),
            titled("v2", "火山地質図 2"),
            titled("x1", "Something else"),
            titled("q2", "20万分の1地質図 B"),
        ];
        show(&mut registry, &mut widget, &results[3]);

        let view = reconcile(&registry, &results);
        let ResultLayout::Grouped(groups) = &view.layout else {
            panic!("expected grouped layout");
        };

        let order: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            order,
            vec![
                MapCategory::Quadrangle,
                MapCategory::Volcanic,
                MapCategory::Gravity,
                MapCategory::Other
            ]
        );
        assert!(groups[0].default_open);
        assert!(groups[1..].iter().all(|g| !g.default_open));
        assert_eq!(groups[1].rows.len(), 2);
        assert_eq!(groups[1].selected_count, 1);
        assert_eq!(view.selected_in_results, 1);
        assert_eq!(view.rows().count(), 6);
    }

    #[test]
    fn test_marks_follow_registry() {
        let mut registry = OverlayRegistry::new(0.7, 18);
        let mut widget = MockWidget::default();
        let results = vec![titled("a", "A"), titled("b", "B")];

        show(&mut registry, &mut widget, &results[1]);
        let view = reconcile(&registry, &results);
        let marks: Vec<_> = view.rows().map(|r| r.selected).collect();
        assert_eq!(marks, vec![false, true]);
        assert_eq!(view.active_layers.len(), 1);
        assert_eq!(view.active_layers[0].id, "b");

        registry.remove("b", &mut widget);
        let view = reconcile(&registry, &results);
        assert!(view.rows().all(|r| !r.selected));
        assert!(view.active_layers.is_empty());
    }

    #[test]
    fn test_row_is_pending_until_resolved() {
        let mut registry = OverlayRegistry::new(0.7, 18);
        let mut widget = MockWidget::default();
        let results = vec![titled("a", "A"), titled("b", "B")];

        let ToggleStep::Resolve(job) =
            registry.toggle(&results[0], TileDescriptorResolver::default(), &mut widget)
        else {
            panic!("expected resolve");
        };
        let view = reconcile(&registry, &results);
        let row = view.rows().find(|r| r.id == "a").unwrap();
        assert!(row.pending && !row.selected);
        assert!(view.rows().filter(|r| r.id == "b").all(|r| !r.pending));

        let done = pollster::block_on(job.run(&MockFetcher::new()));
        assert_eq!(registry.complete(done, &mut widget), Ok(ResolveOutcome::Added));
        let view = reconcile(&registry, &results);
        let row = view.rows().find(|r| r.id == "a").unwrap();
        assert!(row.selected && !row.pending);
    }
}
