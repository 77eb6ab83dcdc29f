//! Card rendering
//!
//! Records become `Card` view models: every text field escaped, the link
//! target already validated. Markup is produced from the view model, never
//! from the raw record.

use crate::config::SiteConfig;
use crate::filter::FilterOutcome;
use crate::record::{BusinessRecord, PLACEHOLDER_URL};
use crate::text::{escape_html, is_valid_url, normalize_search};
use crate::validation::validate_with;
use serde::Serialize;
use std::fmt::Write as _;

/// Normalized text the filter matches against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchKeys {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl SearchKeys {
    fn from_record(record: &BusinessRecord) -> Self {
        Self {
            title: normalize_search(&record.title),
            description: normalize_search(&record.description),
            category: normalize_search(&record.category),
        }
    }
}

/// Outbound "visit" link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitLink {
    /// Validated http(s) URL, unescaped
    pub href: String,
    pub target: &'static str,
    pub rel: &'static str,
    pub aria_label: String,
}

/// One rendered business card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Position of the source record in the directory; `None` for a card
    /// built from a record the directory does not hold
    pub index: Option<usize>,
    pub title: String,
    pub description: String,
    pub image: String,
    /// Image shown when `image` fails to load
    pub fallback_image: String,
    pub alt: String,
    pub lazy: bool,
    pub category: String,
    pub link: VisitLink,
    #[serde(skip)]
    keys: SearchKeys,
}

impl Card {
    /// Build a card from a record
    ///
    /// A URL that is not http(s) is replaced by the inert `#` link.
    #[must_use]
    pub fn from_record(index: usize, record: &BusinessRecord, config: &SiteConfig) -> Self {
        Self::build(Some(index), record, config)
    }

    /// Build a card for a record outside the directory
    #[must_use]
    pub fn detached(record: &BusinessRecord, config: &SiteConfig) -> Self {
        Self::build(None, record, config)
    }

    fn build(index: Option<usize>, record: &BusinessRecord, config: &SiteConfig) -> Self {
        let title = escape_html(&record.title);
        let url = record.url.trim();
        Self {
            index,
            alt: format!("{title} - {}", escape_html(&config.images.default_alt)),
            link: VisitLink {
                href: if is_valid_url(url) { url } else { PLACEHOLDER_URL }.to_string(),
                target: "_blank",
                rel: "noopener noreferrer",
                aria_label: format!("Visitar {title} (se abre en nueva ventana)"),
            },
            title,
            description: escape_html(&record.description),
            image: escape_html(&record.image),
            fallback_image: escape_html(&config.images.default_placeholder),
            lazy: config.images.lazy_load,
            category: escape_html(&record.category),
            keys: SearchKeys::from_record(record),
        }
    }

    /// Normalized search keys
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &SearchKeys {
        &self.keys
    }

    /// Check a normalized term against title, description and category
    ///
    /// The empty term matches every card.
    #[must_use]
    pub fn matches(&self, normalized_term: &str) -> bool {
        normalized_term.is_empty()
            || self.keys.title.contains(normalized_term)
            || self.keys.description.contains(normalized_term)
            || self.keys.category.contains(normalized_term)
    }

    /// Card markup
    #[must_use]
    pub fn to_html(&self) -> String {
        self.html(true)
    }

    /// Markup for the daily recommendation widget
    #[must_use]
    pub fn to_recommendation_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="recommendation-card">"#,
                r#"<img src="{image}" alt="Imagen de {title}" class="recommendation-img" onerror="this.src='{fallback}'; this.onerror=null;">"#,
                r#"<div class="recommendation-content"><h4>{title}</h4><p>{description}</p>"#,
                r#"<a href="{href}" class="recommendation-link" target="{target}" rel="{rel}">Visitar Negocio</a>"#,
                "</div></div>"
            ),
            image = self.image,
            title = self.title,
            fallback = self.fallback_image,
            description = self.description,
            href = escape_html(&self.link.href),
            target = self.link.target,
            rel = self.link.rel,
        )
    }

    fn html(&self, visible: bool) -> String {
        let hidden = if visible { "" } else { " hidden" };
        let loading = if self.lazy { r#" loading="lazy""# } else { "" };
        format!(
            concat!(
                r#"<article class="web-card" role="listitem" data-category="{category}"{hidden}>"#,
                r#"<img src="{image}" alt="{alt}"{loading} width="320" height="180" onerror="this.src='{fallback}'; this.onerror=null;">"#,
                r#"<div class="web-card-content"><h3>{title}</h3><p>{description}</p>"#,
                r#"<a href="{href}" class="web-card-link" target="{target}" rel="{rel}" aria-label="{aria}">Visitar sitio"#,
                r#"<svg class="icon" width="16" height="16" aria-hidden="true" focusable="false"><use xlink:href="icons.svg#external-link"></use></svg>"#,
                "</a></div></article>"
            ),
            category = self.category,
            hidden = hidden,
            image = self.image,
            alt = self.alt,
            loading = loading,
            fallback = self.fallback_image,
            title = self.title,
            description = self.description,
            href = escape_html(&self.link.href),
            target = self.link.target,
            rel = self.link.rel,
            aria = self.link.aria_label,
        )
    }
}

/// Record left out of the rendered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub title: String,
    pub errors: Vec<String>,
}

/// Output of one render pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedDirectory {
    pub cards: Vec<Card>,
    /// Set when no card could be rendered
    pub empty_message: Option<String>,
    /// Invalid records, in input order
    pub skipped: Vec<SkippedRecord>,
}

impl RenderedDirectory {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Markup with every card visible
    #[must_use]
    pub fn to_html(&self) -> String {
        if let Some(message) = &self.empty_message {
            return empty_html(message);
        }
        self.cards.iter().map(Card::to_html).collect()
    }

    /// Markup with non-matching cards hidden and the banner appended
    #[must_use]
    pub fn to_html_filtered(&self, outcome: &FilterOutcome) -> String {
        if let Some(message) = &self.empty_message {
            return empty_html(message);
        }
        let mut out = String::new();
        for (i, card) in self.cards.iter().enumerate() {
            let visible = outcome.visible.get(i).copied().unwrap_or(true);
            out.push_str(&card.html(visible));
        }
        if let Some(banner) = &outcome.banner {
            out.push_str(&banner.to_html());
        }
        let _ = write!(
            out,
            r#"<div class="sr-only" aria-live="polite" aria-atomic="true">{}</div>"#,
            escape_html(&outcome.announcement)
        );
        out
    }
}

fn empty_html(message: &str) -> String {
    format!(r#"<p class="no-webs">{}</p>"#, escape_html(message))
}

/// Render every valid, non-placeholder record
///
/// Placeholders are skipped silently; invalid records are logged and listed
/// in `skipped`. Neither stops the pass.
#[must_use]
pub fn render(records: &[BusinessRecord], config: &SiteConfig) -> RenderedDirectory {
    let mut rendered = RenderedDirectory::default();

    for (index, record) in records.iter().enumerate() {
        if record.is_placeholder() {
            tracing::debug!("Skipping placeholder record {} ({:?})", index, record.title);
            continue;
        }
        let report = validate_with(record, &config.validation);
        if !report.valid {
            tracing::warn!("Invalid record at index {}: {:?}", index, report.errors);
            rendered.skipped.push(SkippedRecord {
                index,
                title: record.title.clone(),
                errors: report.errors,
            });
            continue;
        }
        rendered.cards.push(Card::from_record(index, record, config));
    }

    if rendered.cards.is_empty() {
        rendered.empty_message = Some(config.messages.no_businesses.clone());
    }
    rendered
}
