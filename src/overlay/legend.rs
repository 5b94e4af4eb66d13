//! Legend and attribution content for a shown layer.

use crate::catalog::ResolvedLayerData;
use regex::Regex;
use std::sync::LazyLock;

/// Max title length in the legend header.
const LEGEND_TITLE_CHARS: usize = 25;

struct MarkdownRule {
    pattern: Regex,
    replacement: &'static str,
}

static MARKDOWN_RULES: LazyLock<Vec<MarkdownRule>> = LazyLock::new(|| {
    [
        // "**Label**: " prefixes
        (r"\*\*[^*]+\*\*:\s*", ""),
        (r"\*\*([^*]+)\*\*", "$1"),
        (r"\*([^*]+)\*", "$1"),
        (r"\[([^\]]+)\]\([^)]+\)", ""),
        (r"\(https?://[^)]+\)", ""),
        (r"https?://\S+", ""),
        (r"(?m)^#{1,6}\s+", ""),
        (r"`([^`]+)`", "$1"),
        (r"\s+", " "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| MarkdownRule {
        pattern: Regex::new(pattern).expect("markdown regex"),
        replacement,
    })
    .collect()
});

/// Reduces catalog markdown to a single line of plain text.
pub fn strip_markdown(text: &str) -> String {
    let stripped = MARKDOWN_RULES.iter().fold(text.to_string(), |acc, rule| {
        rule.pattern.replace_all(&acc, rule.replacement).into_owned()
    });
    stripped.trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Pdf,
    GeoTiff,
    DatasetPage,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Pdf => "Explanatory text (PDF)",
            LinkKind::GeoTiff => "Download GeoTIFF",
            LinkKind::DatasetPage => "Dataset page",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLink {
    pub kind: LinkKind,
    pub url: String,
}

/// Image shown in the legend panel.
#[derive(Debug, Clone, PartialEq)]
pub enum LegendImage {
    /// Dedicated legend image from the tile descriptor.
    Legend(String),
    /// Published map image, used when there is no legend image.
    MapImage(String),
}

impl LegendImage {
    pub fn url(&self) -> &str {
        match self {
            LegendImage::Legend(url) | LegendImage::MapImage(url) => url,
        }
    }
}

/// Everything the legend panel renders for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendView {
    pub layer_id: String,
    pub title: String,
    pub full_title: String,
    /// "title　authors", copyable as a citation.
    pub citation: Option<String>,
    pub links: Vec<LegendLink>,
    pub image: Option<LegendImage>,
    /// Nothing but the dataset page link is available.
    pub unavailable: bool,
}

impl LegendView {
    pub fn build(data: &ResolvedLayerData, dataset_page_base: &str) -> Self {
        let candidate = &data.candidate;

        let title_text = match &data.title_j {
            Some(t) => strip_markdown(t),
            None => candidate.title.clone(),
        };
        let author_text = match &data.authors_j {
            Some(a) => strip_markdown(a),
            None => candidate.author.clone().unwrap_or_default(),
        };
        let citation = match (title_text.is_empty(), author_text.is_empty()) {
            (true, _) => None,
            (false, true) => Some(title_text),
            (false, false) => Some(format!("{}\u{3000}{}", title_text, author_text)),
        };

        let dataset_page = format!(
            "{}/{}",
            dataset_page_base.trim_end_matches('/'),
            candidate.name
        );

        let mut links = Vec::new();
        if let Some(url) = &candidate.pdf_url {
            links.push(LegendLink {
                kind: LinkKind::Pdf,
                url: url.clone(),
            });
        }
        if let Some(url) = &data.geotiff_url {
            links.push(LegendLink {
                kind: LinkKind::GeoTiff,
                url: url.clone(),
            });
        }
        links.push(LegendLink {
            kind: LinkKind::DatasetPage,
            url: dataset_page,
        });

        let image = data
            .legend_url
            .clone()
            .map(LegendImage::Legend)
            .or_else(|| candidate.image_url.clone().map(LegendImage::MapImage));

        let unavailable = data.legend_url.is_none()
            && candidate.image_url.is_none()
            && candidate.notes.is_none()
            && data.description.is_none()
            && candidate.pdf_url.is_none();

        Self {
            layer_id: candidate.id.clone(),
            title: super::reconcile::truncate_title(&data.display_title, LEGEND_TITLE_CHARS),
            full_title: data.display_title.clone(),
            citation,
            links,
            image,
            unavailable,
        }
    }

    pub fn dataset_page(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.kind == LinkKind::DatasetPage)
            .map(|l| l.url.as_str())
    }
}
