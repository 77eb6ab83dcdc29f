//! Directory page controller
//!
//! `DirectoryApp` owns every piece of page state and a virtual clock. Input
//! arrives as `UiEvent`s, time moves through `advance`, and `view` returns a
//! snapshot for whatever draws the page. Nothing in here blocks or spawns.

use crate::config::SiteConfig;
use crate::directory::Directory;
use crate::error::DirectoryError;
use crate::filter::{filter, FilterOutcome, NoResultsBanner};
use crate::navigation::{NavigationController, SectionView, Transition};
use crate::notify::{Notification, NotificationCenter, NotificationId, NotificationKind, NotificationTimer};
use crate::record::BusinessRecord;
use crate::recommend::{Clock, RecommendationPicker};
use crate::render::{render, Card, RenderedDirectory};
use crate::store::KeyValueStore;
use crate::text::parse_web_url;
use crate::timer::{Debouncer, TimerId, TimerQueue};
use rand::Rng;
use serde::Serialize;
use std::time::Duration;

/// Page regions the controller may render into
///
/// A missing region disables only the step that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    pub directory_container: bool,
    pub recommendation_container: bool,
    pub navigation: bool,
    pub search_input: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            directory_container: true,
            recommendation_container: true,
            navigation: true,
            search_input: true,
        }
    }
}

/// User input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Search box content changed
    SearchInput(String),
    /// Clear button or empty submit
    ClearSearch,
    /// Navigation link clicked; carries the section id or `#id`
    NavClick(String),
    /// Browser history moved; carries the new fragment
    PopState(Option<String>),
    ToggleMenu,
    EscapeKey,
    /// Click outside the menu and its toggle
    OutsideClick,
    DismissNotification(NotificationId),
    AddBusiness(BusinessRecord),
}

/// Timer payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppTimer {
    SearchDebounce,
    FocusHeading(String),
    Notification(NotificationTimer),
}

impl From<NotificationTimer> for AppTimer {
    fn from(timer: NotificationTimer) -> Self {
        Self::Notification(timer)
    }
}

/// Result of following a card link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VisitOutcome {
    /// Open this URL in a new window
    Open(String),
    /// URL was not a valid http(s) address
    Refused,
}

/// State of the recommendation widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecommendationView {
    /// Not loaded yet
    Pending,
    Pick(Card),
    /// Nothing to recommend today
    Empty { message: String },
    /// Region missing or loading failed
    Unavailable,
}

impl RecommendationView {
    /// Widget markup
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Pick(card) => card.to_recommendation_html(),
            Self::Empty { message } => format!("<p>{}</p>", crate::text::escape_html(message)),
            Self::Pending | Self::Unavailable => String::new(),
        }
    }
}

/// Snapshot of everything on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub cards: Vec<Card>,
    /// Visibility per card
    pub visible: Vec<bool>,
    pub empty_message: Option<String>,
    pub banner: Option<NoResultsBanner>,
    pub announcement: String,
    /// Current search box content
    pub search_term: String,
    pub active_section: Option<String>,
    pub sections: Vec<SectionView>,
    pub fragment: Option<String>,
    pub menu_open: bool,
    /// Element that currently holds focus
    pub focus: Option<String>,
    pub notifications: Vec<Notification>,
    pub recommendation: RecommendationView,
}

impl PageView {
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// Cards that pass the current filter
    pub fn visible_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards
            .iter()
            .zip(&self.visible)
            .filter_map(|(card, visible)| visible.then_some(card))
    }
}

/// Directory page controller
#[derive(Debug)]
pub struct DirectoryApp {
    config: SiteConfig,
    layout: PageLayout,
    directory: Directory,
    rendered: Option<RenderedDirectory>,
    outcome: FilterOutcome,
    search_input: String,
    debounce: Debouncer,
    navigation: Option<NavigationController>,
    notifications: NotificationCenter,
    timers: TimerQueue<AppTimer>,
    focus: Option<String>,
    focus_timer: Option<TimerId>,
    recommendation: RecommendationView,
    initialized: bool,
}

impl DirectoryApp {
    /// Create controller with a full page layout
    #[must_use]
    pub fn new(config: SiteConfig, directory: Directory) -> Self {
        Self {
            layout: PageLayout::default(),
            outcome: FilterOutcome::unfiltered(0, &config),
            debounce: Debouncer::new(config.search.debounce_delay()),
            notifications: NotificationCenter::new(config.notifications.clone()),
            config,
            directory,
            rendered: None,
            search_input: String::new(),
            navigation: None,
            timers: TimerQueue::new(),
            focus: None,
            focus_timer: None,
            recommendation: RecommendationView::Pending,
            initialized: false,
        }
    }

    /// With page layout
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Bring up navigation, the card list and search
    ///
    /// Each step needs its own page region; a missing region aborts that step
    /// with an error notification and the remaining steps still run.
    pub fn initialize(&mut self, fragment: Option<&str>) {
        if self.initialized {
            tracing::warn!("Directory app already initialized");
            return;
        }
        self.initialized = true;

        if self.layout.navigation {
            self.navigation = Some(NavigationController::new(&self.config.navigation, fragment));
        } else {
            tracing::error!("Navigation elements missing; navigation disabled");
            let message = self.config.messages.init_failed.clone();
            self.notify(message, NotificationKind::Error);
        }

        if self.layout.directory_container {
            self.rerender();
        } else {
            tracing::error!("Directory container missing; cards not rendered");
            let message = self.config.messages.load_failed.clone();
            self.notify(message, NotificationKind::Error);
        }

        if !self.layout.search_input {
            tracing::error!("Search input missing; search disabled");
            let message = self.config.messages.init_failed.clone();
            self.notify(message, NotificationKind::Error);
        }

        tracing::info!(
            "Directory app initialized with {} records",
            self.directory.len()
        );
    }

    /// Fill the recommendation widget
    pub fn load_recommendation<C, S, R>(
        &mut self,
        picker: &RecommendationPicker<C>,
        store: &mut S,
        rng: &mut R,
    ) where
        C: Clock,
        S: KeyValueStore + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.layout.recommendation_container {
            tracing::error!("Recommendation container missing");
            self.recommendation = RecommendationView::Unavailable;
            let message = self.config.messages.recommendation_failed.clone();
            self.notify(message, NotificationKind::Error);
            return;
        }

        self.recommendation = match picker.get_daily(self.directory.records(), store, rng) {
            Ok(Some(record)) => {
                let card = match self.directory.records().iter().position(|r| *r == record) {
                    Some(index) => Card::from_record(index, &record, &self.config),
                    None => Card::detached(&record, &self.config),
                };
                RecommendationView::Pick(card)
            }
            Ok(None) => RecommendationView::Empty {
                message: self.config.messages.no_recommendation.clone(),
            },
            Err(e) => {
                tracing::warn!("Daily recommendation failed: {}", e);
                let message = self.config.messages.recommendation_failed.clone();
                self.notify(message, NotificationKind::Error);
                RecommendationView::Unavailable
            }
        };
    }

    /// Apply one user input
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SearchInput(text) => {
                if !self.search_enabled() {
                    return;
                }
                self.search_input = text;
                self.debounce.schedule(&mut self.timers, AppTimer::SearchDebounce);
            }
            UiEvent::ClearSearch => {
                if !self.search_enabled() {
                    return;
                }
                self.search_input.clear();
                self.debounce.cancel(&mut self.timers);
                self.apply_filter("");
            }
            UiEvent::NavClick(target) => {
                if let Some(nav) = self.navigation.as_mut() {
                    if let Ok(transition) = nav.navigate(&target) {
                        self.after_transition(&transition);
                    }
                }
            }
            UiEvent::PopState(fragment) => {
                if let Some(nav) = self.navigation.as_mut() {
                    if let Ok(transition) = nav.pop_state(fragment.as_deref()) {
                        self.after_transition(&transition);
                    }
                }
            }
            UiEvent::ToggleMenu => {
                if let Some(nav) = self.navigation.as_mut() {
                    nav.toggle_menu();
                }
            }
            UiEvent::EscapeKey => {
                if let Some(nav) = self.navigation.as_mut() {
                    if nav.close_menu() {
                        self.focus = Some("menuToggle".to_string());
                    }
                }
            }
            UiEvent::OutsideClick => {
                if let Some(nav) = self.navigation.as_mut() {
                    nav.close_menu();
                }
            }
            UiEvent::DismissNotification(id) => {
                self.notifications.dismiss(id, &mut self.timers);
            }
            UiEvent::AddBusiness(record) => {
                // outcome is reported through a notification
                let _ = self.add_business(record);
            }
        }
    }

    /// Validate and append a record, then re-render
    pub fn add_business(&mut self, record: BusinessRecord) -> Result<(), DirectoryError> {
        match self.directory.append(record, &self.config.validation) {
            Ok(added) => {
                let message = format!(
                    "\"{}\" {}",
                    added.title, self.config.messages.added_successfully
                );
                if self.layout.directory_container && self.initialized {
                    self.rerender();
                }
                self.notify(message, NotificationKind::Success);
                Ok(())
            }
            Err(e) => {
                let message = self.config.messages.invalid_data.clone();
                self.notify(message, NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Follow a card link
    ///
    /// Anything that is not an http(s) URL is refused with an error
    /// notification and never opened.
    pub fn visit(&mut self, url: &str) -> VisitOutcome {
        let url = url.trim();
        if parse_web_url(url).is_some() {
            VisitOutcome::Open(url.to_string())
        } else {
            tracing::warn!("Refusing to open invalid URL {:?}", url);
            let message = self.config.messages.invalid_url.clone();
            self.notify(message, NotificationKind::Error);
            VisitOutcome::Refused
        }
    }

    /// Show a notification
    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.notifications.notify(message, kind, &mut self.timers)
    }

    /// Move the clock forward by `elapsed`, firing due timers
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        self.advance_to(until);
    }

    /// Move the clock to `now`, firing due timers in deadline order
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((id, timer)) = self.timers.pop_due(now) {
            self.on_timer(id, timer);
        }
        self.timers.advance_to(now);
    }

    /// Earliest pending timer deadline on the controller clock
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Controller clock
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Page snapshot
    #[must_use]
    pub fn view(&self) -> PageView {
        let (cards, empty_message) = match &self.rendered {
            Some(rendered) => (rendered.cards.clone(), rendered.empty_message.clone()),
            None => (Vec::new(), None),
        };
        let nav = self.navigation.as_ref();

        PageView {
            cards,
            visible: self.outcome.visible.clone(),
            empty_message,
            banner: self.outcome.banner.clone(),
            announcement: self.outcome.announcement.clone(),
            search_term: self.search_input.clone(),
            active_section: nav.map(|n| n.active().to_string()),
            sections: nav.map(NavigationController::sections).unwrap_or_default(),
            fragment: nav.and_then(|n| n.fragment().map(str::to_string)),
            menu_open: nav.is_some_and(NavigationController::menu_open),
            focus: self.focus.clone(),
            notifications: self.notifications.active().to_vec(),
            recommendation: self.recommendation.clone(),
        }
    }

    /// Card list markup for the current filter
    #[must_use]
    pub fn directory_html(&self) -> String {
        self.rendered
            .as_ref()
            .map(|r| r.to_html_filtered(&self.outcome))
            .unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Filter outcome currently applied
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> &FilterOutcome {
        &self.outcome
    }

    #[inline]
    #[must_use]
    pub fn navigation(&self) -> Option<&NavigationController> {
        self.navigation.as_ref()
    }

    fn search_enabled(&self) -> bool {
        if !self.layout.search_input {
            tracing::debug!("Search input missing; ignoring search event");
        }
        self.layout.search_input
    }

    fn on_timer(&mut self, id: TimerId, timer: AppTimer) {
        match timer {
            AppTimer::SearchDebounce => {
                if self.debounce.fire(id) {
                    let term = self.search_input.clone();
                    self.apply_filter(&term);
                }
            }
            AppTimer::FocusHeading(section) => {
                if self.focus_timer == Some(id) {
                    self.focus_timer = None;
                    self.focus = Some(format!("{section}-heading"));
                }
            }
            AppTimer::Notification(timer) => {
                self.notifications.on_timer(timer, &mut self.timers);
            }
        }
    }

    fn after_transition(&mut self, transition: &Transition) {
        if let Some(previous) = self.focus_timer.take() {
            self.timers.cancel(previous);
        }
        let delay = self.config.animations.focus_delay();
        self.focus_timer = Some(
            self.timers
                .schedule(delay, AppTimer::FocusHeading(transition.focus.clone())),
        );
    }

    fn rerender(&mut self) {
        let rendered = render(self.directory.records(), &self.config);
        self.outcome = filter(&rendered.cards, &self.outcome.term, &self.config);
        self.rendered = Some(rendered);
    }

    fn apply_filter(&mut self, term: &str) {
        if let Some(rendered) = &self.rendered {
            self.outcome = filter(&rendered.cards, term, &self.config);
        }
    }
}
