//! Search filtering over rendered cards
//!
//! Matching is a substring test on normalized text (lower-case, no
//! diacritics). The debounce lives in the controller; `filter` itself is pure.

use crate::config::SiteConfig;
use crate::record::BusinessRecord;
use crate::render::{render, Card};
use crate::text::{escape_html, normalize_search};
use serde::Serialize;

/// "No results" banner shown when a non-empty term hides every card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoResultsBanner {
    /// Escaped search term
    pub term: String,
    /// Full banner text, term quoted
    pub message: String,
}

impl NoResultsBanner {
    fn new(term: &str, prefix: &str) -> Self {
        let term = escape_html(term.trim());
        Self {
            message: format!("{} \"{}\"", escape_html(prefix), term),
            term,
        }
    }

    /// Banner markup
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="no-results" role="status"><p>{}</p></div>"#,
            self.message
        )
    }
}

/// Result of one filter pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    /// Term as typed
    pub term: String,
    /// Term actually matched; empty when shorter than the minimum
    pub normalized_term: String,
    /// Visibility per card, same order as the input
    pub visible: Vec<bool>,
    pub visible_count: usize,
    pub banner: Option<NoResultsBanner>,
    /// Live-region text with the match count
    pub announcement: String,
}

impl FilterOutcome {
    /// Outcome with every card visible and no term
    #[must_use]
    pub fn unfiltered(card_count: usize, config: &SiteConfig) -> Self {
        Self {
            term: String::new(),
            normalized_term: String::new(),
            visible: vec![true; card_count],
            visible_count: card_count,
            banner: None,
            announcement: config.messages.announce_results(card_count),
        }
    }

    /// Indices (into the card list) of the visible cards
    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.then_some(i))
    }
}

/// Apply a search term to rendered cards
///
/// A card stays visible iff the normalized term is empty or is a substring of
/// its normalized title, description or category.
#[must_use]
pub fn filter(cards: &[Card], term: &str, config: &SiteConfig) -> FilterOutcome {
    let mut normalized_term = normalize_search(term);
    if normalized_term.chars().count() < config.search.min_characters {
        normalized_term.clear();
    }

    let visible: Vec<bool> = cards.iter().map(|c| c.matches(&normalized_term)).collect();
    let visible_count = visible.iter().filter(|v| **v).count();

    let banner = (visible_count == 0 && !normalized_term.is_empty())
        .then(|| NoResultsBanner::new(term, &config.search.no_results_message));

    tracing::debug!(
        "Filter {:?}: {}/{} cards visible",
        normalized_term,
        visible_count,
        cards.len()
    );

    FilterOutcome {
        term: term.to_string(),
        normalized_term,
        visible,
        visible_count,
        banner,
        announcement: config.messages.announce_results(visible_count),
    }
}

/// Visibility by category; an empty category or `"all"` shows every card
#[must_use]
pub fn filter_by_category(cards: &[Card], category: &str) -> Vec<bool> {
    let wanted = normalize_search(category);
    if wanted.is_empty() || wanted == "all" {
        return vec![true; cards.len()];
    }
    cards.iter().map(|c| c.keys().category == wanted).collect()
}

/// Records whose cards survive `filter`, in directory order
#[must_use]
pub fn search_records(records: &[BusinessRecord], term: &str, config: &SiteConfig) -> Vec<BusinessRecord> {
    let rendered = render(records, config);
    let outcome = filter(&rendered.cards, term, config);
    outcome
        .visible_indices()
        .filter_map(|i| rendered.cards[i].index)
        .map(|index| records[index].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;

    fn bundled_cards(config: &SiteConfig) -> Vec<Card> {
        render(Directory::bundled().records(), config).cards
    }

    #[test]
    fn empty_term_shows_everything() {
        let config = SiteConfig::default();
        let cards = bundled_cards(&config);
        let outcome = filter(&cards, "   ", &config);

        assert_eq!(outcome.visible_count, cards.len());
        assert!(outcome.banner.is_none());
        assert_eq!(outcome, FilterOutcome { term: "   ".into(), ..FilterOutcome::unfiltered(cards.len(), &config) });
    }

    #[test]
    fn accent_insensitive_match() {
        let config = SiteConfig::default();
        let cards = bundled_cards(&config);

        let outcome = filter(&cards, "PELUQUERIA", &config);
        assert_eq!(outcome.visible_count, 1);
        assert_eq!(outcome.announcement, "Se encontraron 1 negocios");

        let outcome = filter(&cards, "cárnicos", &config);
        assert_eq!(outcome.visible_count, 1);
    }

    #[test]
    fn category_is_searched() {
        let config = SiteConfig::default();
        let records = vec![BusinessRecord::new(
            "Patas Felices",
            "Comida y accesorios para perros y gatos.",
            "https://spoo.me/patas",
            "img",
            "Mascotas",
        )];
        let cards = render(&records, &config).cards;
        assert_eq!(filter(&cards, "mascotas", &config).visible_count, 1);
    }

    #[test]
    fn no_match_shows_escaped_banner() {
        let config = SiteConfig::default();
        let cards = bundled_cards(&config);

        let outcome = filter(&cards, "<zzz-no-match>", &config);
        assert_eq!(outcome.visible_count, 0);
        let banner = outcome.banner.unwrap();
        assert_eq!(banner.term, "&lt;zzz-no-match&gt;");
        assert_eq!(
            banner.message,
            "No se encontraron negocios que coincidan con \"&lt;zzz-no-match&gt;\""
        );
    }

    #[test]
    fn short_terms_match_everything() {
        let mut config = SiteConfig::default();
        config.search.min_characters = 3;
        let cards = bundled_cards(&config);

        let outcome = filter(&cards, "zz", &config);
        assert_eq!(outcome.visible_count, cards.len());
        assert!(outcome.normalized_term.is_empty());
        assert!(outcome.banner.is_none());
    }

    #[test]
    fn category_filter() {
        let config = SiteConfig::default();
        let cards = bundled_cards(&config);

        let tiendas = filter_by_category(&cards, "tienda");
        assert_eq!(tiendas.iter().filter(|v| **v).count(), 3);
        assert!(filter_by_category(&cards, "all").iter().all(|v| *v));
    }

    #[test]
    fn search_records_maps_back_to_source() {
        let directory = Directory::bundled();
        let found = search_records(directory.records(), "nails", &SiteConfig::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Suri Nails");
    }
}
