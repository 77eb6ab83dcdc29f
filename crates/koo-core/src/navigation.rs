//! Section navigation
//!
//! Exactly one section is active at a time. The address fragment mirrors the
//! active section (`#negocios`) and every successful navigation pushes a
//! history entry, except when restoring from history.

use crate::config::NavigationConfig;
use crate::error::NavigationError;
use serde::Serialize;

/// Result of a successful navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Section that was active before
    pub from: String,
    /// Section now active
    pub to: String,
    /// Section whose heading receives focus
    pub focus: String,
    /// Fragment after the transition, if URL updates are enabled
    pub fragment: Option<String>,
    /// True if an open mobile menu was closed
    pub closed_menu: bool,
}

/// Visibility of one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub visible: bool,
    pub aria_hidden: bool,
}

/// Strip the leading `#` from an address fragment
///
/// Returns `None` for an empty fragment.
#[must_use]
pub fn parse_fragment(fragment: &str) -> Option<&str> {
    let id = fragment.trim().trim_start_matches('#');
    (!id.is_empty()).then_some(id)
}

/// Section state machine plus mobile menu flag
#[derive(Debug, Clone)]
pub struct NavigationController {
    sections: Vec<String>,
    default_section: String,
    update_url: bool,
    active: String,
    fragment: Option<String>,
    history: Vec<String>,
    menu_open: bool,
}

impl NavigationController {
    /// Create controller, starting at `initial_fragment` if it names a known section
    #[must_use]
    pub fn new(config: &NavigationConfig, initial_fragment: Option<&str>) -> Self {
        let known = initial_fragment
            .and_then(parse_fragment)
            .filter(|id| config.sections.iter().any(|s| s == id));
        let active = known.map_or_else(|| config.default_section.clone(), str::to_string);
        let fragment = known.map(|id| format!("#{id}"));

        Self {
            sections: config.sections.clone(),
            default_section: config.default_section.clone(),
            update_url: config.update_url,
            active,
            fragment,
            history: Vec::new(),
            menu_open: false,
        }
    }

    /// Check if `id` is a configured section
    #[must_use]
    pub fn is_known(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s == id)
    }

    /// Activate a section
    ///
    /// Unknown targets are rejected and leave every piece of state as it was.
    pub fn navigate(&mut self, target: &str) -> Result<Transition, NavigationError> {
        self.go(target, true)
    }

    /// Restore the section named by a history fragment
    ///
    /// An empty or missing fragment means the default section. No history
    /// entry is pushed.
    pub fn pop_state(&mut self, fragment: Option<&str>) -> Result<Transition, NavigationError> {
        let target = fragment
            .and_then(parse_fragment)
            .map_or_else(|| self.default_section.clone(), str::to_string);
        self.go(&target, false)
    }

    fn go(&mut self, target: &str, push: bool) -> Result<Transition, NavigationError> {
        let target = target.trim().trim_start_matches('#');
        if !self.is_known(target) {
            tracing::warn!("Ignoring navigation to unknown section {:?}", target);
            return Err(NavigationError::UnknownSection(target.to_string()));
        }

        let from = std::mem::replace(&mut self.active, target.to_string());
        if self.update_url {
            let fragment = format!("#{target}");
            if push && self.fragment.as_deref() != Some(fragment.as_str()) {
                self.history.push(fragment.clone());
            }
            self.fragment = Some(fragment);
        }
        let closed_menu = self.close_menu();

        tracing::debug!("Navigated {} -> {}", from, target);
        Ok(Transition {
            from,
            to: target.to_string(),
            focus: target.to_string(),
            fragment: self.fragment.clone(),
            closed_menu,
        })
    }

    /// Flip the mobile menu; returns the new state
    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    /// Close the mobile menu; returns true if it was open
    pub fn close_menu(&mut self) -> bool {
        std::mem::replace(&mut self.menu_open, false)
    }

    #[inline]
    #[must_use]
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Current address fragment (`#id`), if one has been set
    #[inline]
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    /// Pushed history entries, oldest first
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Visibility of every section in menu order
    #[must_use]
    pub fn sections(&self) -> Vec<SectionView> {
        self.sections
            .iter()
            .map(|id| {
                let visible = *id == self.active;
                SectionView {
                    id: id.clone(),
                    visible,
                    aria_hidden: !visible,
                }
            })
            .collect()
    }
}
