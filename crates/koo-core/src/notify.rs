//! Transient notifications
//!
//! Lifecycle: `Entering` (slide-in) → `Visible` → `Leaving` (slide-out) →
//! removed. Every transition is a timer on the owner's `TimerQueue`; the
//! center only records which timer belongs to which notification.

use crate::config::NotificationConfig;
use crate::text::escape_html;
use crate::timer::{TimerId, TimerQueue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl NotificationKind {
    /// Lower-case name used in CSS classes and config keys
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// Notification identifier, unique per center
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification-{}", self.0)
    }
}

/// Animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Entering,
    Visible,
    Leaving,
}

/// A notification currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    /// Raw message; escaped by `to_html`
    pub message: String,
    pub color: String,
    pub icon: String,
    pub phase: Phase,
    #[serde(skip)]
    auto_close: Option<TimerId>,
}

impl Notification {
    /// Alert markup with escaped message
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="notification notification-{kind}" id="{id}" role="alert" aria-live="polite" aria-atomic="true" data-phase="{phase}" style="background: {color}">"#,
                r#"<svg class="icon" width="20" height="20" aria-hidden="true" focusable="false"><use xlink:href="icons.svg#{icon}"></use></svg>"#,
                "<span>{message}</span>",
                r#"<button class="notification-close" aria-label="Cerrar notificación" type="button">"#,
                r#"<svg class="icon" width="16" height="16" aria-hidden="true" focusable="false"><use xlink:href="icons.svg#close"></use></svg>"#,
                "</button></div>"
            ),
            kind = self.kind,
            id = self.id,
            phase = match self.phase {
                Phase::Entering => "entering",
                Phase::Visible => "visible",
                Phase::Leaving => "leaving",
            },
            color = escape_html(&self.color),
            icon = escape_html(&self.icon),
            message = escape_html(&self.message),
        )
    }
}

/// Timer payloads owned by the notification center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTimer {
    /// Slide-in finished
    Show(NotificationId),
    /// Display duration elapsed
    AutoClose(NotificationId),
    /// Slide-out finished
    Remove(NotificationId),
}

/// Active notifications in insertion order
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    config: NotificationConfig,
    next_id: u64,
    active: Vec<Notification>,
}

impl NotificationCenter {
    /// Create empty center
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            next_id: 0,
            active: Vec::new(),
        }
    }

    /// Show a message; it closes itself after the configured duration
    pub fn notify<T: From<NotificationTimer>>(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        timers: &mut TimerQueue<T>,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;

        let style = self.config.styles.for_kind(kind);
        let message = message.into();
        tracing::debug!("Notification {} ({}): {}", id, kind, message);

        timers.schedule(self.config.enter_delay(), NotificationTimer::Show(id).into());
        let auto_close = timers.schedule(
            self.config.duration(),
            NotificationTimer::AutoClose(id).into(),
        );

        self.active.push(Notification {
            id,
            kind,
            message,
            color: style.color.clone(),
            icon: style.icon.clone(),
            phase: Phase::Entering,
            auto_close: Some(auto_close),
        });
        id
    }

    /// Close on user request, cancelling the pending auto-close
    pub fn dismiss<T: From<NotificationTimer>>(
        &mut self,
        id: NotificationId,
        timers: &mut TimerQueue<T>,
    ) -> bool {
        self.close(id, timers)
    }

    /// Start the slide-out; a no-op if already leaving or gone
    pub fn close<T: From<NotificationTimer>>(
        &mut self,
        id: NotificationId,
        timers: &mut TimerQueue<T>,
    ) -> bool {
        let exit = self.config.exit_duration();
        let Some(notification) = self.active.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if notification.phase == Phase::Leaving {
            return false;
        }
        if let Some(timer) = notification.auto_close.take() {
            timers.cancel(timer);
        }
        notification.phase = Phase::Leaving;
        timers.schedule(exit, NotificationTimer::Remove(id).into());
        true
    }

    /// Apply a fired timer
    pub fn on_timer<T: From<NotificationTimer>>(
        &mut self,
        timer: NotificationTimer,
        timers: &mut TimerQueue<T>,
    ) {
        match timer {
            NotificationTimer::Show(id) => {
                if let Some(n) = self.active.iter_mut().find(|n| n.id == id) {
                    if n.phase == Phase::Entering {
                        n.phase = Phase::Visible;
                    }
                }
            }
            NotificationTimer::AutoClose(id) => {
                if let Some(n) = self.active.iter_mut().find(|n| n.id == id) {
                    n.auto_close = None;
                }
                self.close(id, timers);
            }
            NotificationTimer::Remove(id) => {
                self.active.retain(|n| n.id != id);
            }
        }
    }

    /// Notifications on screen, oldest first
    #[inline]
    #[must_use]
    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.active.iter().find(|n| n.id == id)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain(center: &mut NotificationCenter, timers: &mut TimerQueue<NotificationTimer>, until: u64) {
        let until = Duration::from_millis(until);
        while let Some((_, timer)) = timers.pop_due(until) {
            center.on_timer(timer, timers);
        }
        timers.advance_to(until);
    }

    #[test]
    fn lifecycle_with_default_timings() {
        let mut timers = TimerQueue::new();
        let mut center = NotificationCenter::new(NotificationConfig::default());

        let id = center.notify("Guardado", NotificationKind::Success, &mut timers);
        let n = center.get(id).unwrap();
        assert_eq!(n.phase, Phase::Entering);
        assert_eq!(n.color, "#10b981");
        assert_eq!(n.icon, "feature1");

        drain(&mut center, &mut timers, 100);
        assert_eq!(center.get(id).unwrap().phase, Phase::Visible);

        drain(&mut center, &mut timers, 5000);
        assert_eq!(center.get(id).unwrap().phase, Phase::Leaving);

        drain(&mut center, &mut timers, 5299);
        assert!(center.get(id).is_some());
        drain(&mut center, &mut timers, 5300);
        assert!(center.is_empty());
    }

    #[test]
    fn dismiss_cancels_auto_close() {
        let mut timers = TimerQueue::new();
        let mut center = NotificationCenter::new(NotificationConfig::default());

        let id = center.notify("Hola", NotificationKind::Info, &mut timers);
        drain(&mut center, &mut timers, 1000);
        assert!(center.dismiss(id, &mut timers));

        // only the removal timer remains
        assert_eq!(timers.len(), 1);
        drain(&mut center, &mut timers, 1300);
        assert!(center.is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn closing_twice_is_a_no_op() {
        let mut timers = TimerQueue::new();
        let mut center = NotificationCenter::new(NotificationConfig::default());

        let id = center.notify("Hola", NotificationKind::Warning, &mut timers);
        assert!(center.close(id, &mut timers));
        assert!(!center.close(id, &mut timers));
        assert!(!center.dismiss(id, &mut timers));

        let removals = std::iter::from_fn(|| timers.pop_due(Duration::from_secs(60)))
            .filter(|(_, t)| matches!(t, NotificationTimer::Remove(_)))
            .count();
        assert_eq!(removals, 1);
    }

    #[test]
    fn message_is_escaped_in_markup() {
        let mut timers = TimerQueue::<NotificationTimer>::new();
        let mut center = NotificationCenter::new(NotificationConfig::default());
        let id = center.notify("<b>\"Aly\"</b>", NotificationKind::Error, &mut timers);

        let html = center.get(id).unwrap().to_html();
        assert!(html.contains("&lt;b&gt;&quot;Aly&quot;&lt;&#x2F;b&gt;"));
        assert!(html.contains("notification-error"));
        assert!(html.contains("icons.svg#close"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("SUCCESS".parse::<NotificationKind>(), Ok(NotificationKind::Success));
        assert!("fatal".parse::<NotificationKind>().is_err());
        assert_eq!(NotificationKind::Warning.to_string(), "warning");
    }
}
