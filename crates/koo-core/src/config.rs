//! Site configuration
//!
//! Every field has a default so a partial TOML file (or none at all) is
//! enough. Durations are stored as milliseconds and exposed as `Duration`.

use crate::error::ConfigError;
use crate::notify::NotificationKind;
use crate::validation::ValidationRules;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete site configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site identity
    pub site: SiteInfo,
    /// Search box behaviour
    pub search: SearchConfig,
    /// Notification timing and styles
    pub notifications: NotificationConfig,
    /// Card image defaults
    pub images: ImageConfig,
    /// Section navigation
    pub navigation: NavigationConfig,
    /// Record validation rules
    pub validation: ValidationRules,
    /// User-facing strings
    pub messages: Messages,
    /// Animation timings
    pub animations: AnimationConfig,
}

impl SiteConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text and check consistency
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        if nav.sections.is_empty() {
            return Err(ConfigError::Invalid("navigation.sections is empty".into()));
        }
        if !nav.sections.contains(&nav.default_section) {
            return Err(ConfigError::Invalid(format!(
                "navigation.default_section {:?} is not a configured section",
                nav.default_section
            )));
        }
        for (name, rule) in [
            ("title", self.validation.title),
            ("description", self.validation.description),
        ] {
            if rule.min > rule.max {
                return Err(ConfigError::Invalid(format!(
                    "validation.{name}: min {} exceeds max {}",
                    rule.min, rule.max
                )));
            }
        }
        Ok(())
    }

    /// With search debounce delay
    #[inline]
    #[must_use]
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.search.debounce_delay_ms = millis(delay);
        self
    }

    /// With notification auto-dismiss duration
    #[inline]
    #[must_use]
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notifications.duration_ms = millis(duration);
        self
    }

    /// With navigation sections and default
    #[must_use]
    pub fn with_sections<I, S>(mut self, sections: I, default_section: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.navigation.sections = sections.into_iter().map(Into::into).collect();
        self.navigation.default_section = default_section.into();
        self
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Site identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    pub url: String,
    pub author: String,
    pub year: u16,
    pub version: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "KOOPAGES".to_string(),
            description: "Plataforma de negocios patrocinados por KOOWEXA".to_string(),
            url: "https://koopages.com".to_string(),
            author: "KOOPAGES".to_string(),
            year: 2025,
            version: "1.0.0".to_string(),
        }
    }
}

/// Search behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a filter pass runs
    pub debounce_delay_ms: u64,
    /// Normalized terms shorter than this match everything
    pub min_characters: usize,
    pub placeholder: String,
    /// Prefix of the no-results banner
    pub no_results_message: String,
}

impl SearchConfig {
    /// Debounce delay as a duration
    #[inline]
    #[must_use]
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 300,
            min_characters: 1,
            placeholder: "Buscar negocios por nombre o descripción...".to_string(),
            no_results_message: "No se encontraron negocios que coincidan con".to_string(),
        }
    }
}

/// Colour and icon for one notification kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStyle {
    pub color: String,
    pub icon: String,
}

impl NotificationStyle {
    fn new(color: &str, icon: &str) -> Self {
        Self {
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Per-kind notification styles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationStyles {
    pub info: NotificationStyle,
    pub success: NotificationStyle,
    pub error: NotificationStyle,
    pub warning: NotificationStyle,
}

impl NotificationStyles {
    /// Style for a kind
    #[must_use]
    pub fn for_kind(&self, kind: NotificationKind) -> &NotificationStyle {
        match kind {
            NotificationKind::Info => &self.info,
            NotificationKind::Success => &self.success,
            NotificationKind::Error => &self.error,
            NotificationKind::Warning => &self.warning,
        }
    }
}

impl Default for NotificationStyles {
    fn default() -> Self {
        Self {
            info: NotificationStyle::new("#3b82f6", "feature2"),
            success: NotificationStyle::new("#10b981", "feature1"),
            error: NotificationStyle::new("#ef4444", "close"),
            warning: NotificationStyle::new("#f59e0b", "feature1"),
        }
    }
}

/// Notification timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Time a notification stays before closing itself
    pub duration_ms: u64,
    /// Delay before the slide-in completes
    pub enter_delay_ms: u64,
    /// Slide-out time before removal
    pub exit_duration_ms: u64,
    pub position: String,
    pub styles: NotificationStyles,
}

impl NotificationConfig {
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    #[inline]
    #[must_use]
    pub fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }

    #[inline]
    #[must_use]
    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_duration_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            enter_delay_ms: 100,
            exit_duration_ms: 300,
            position: "top-right".to_string(),
            styles: NotificationStyles::default(),
        }
    }
}

/// Card image defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Substituted when a card image fails to load
    pub default_placeholder: String,
    pub default_alt: String,
    pub lazy_load: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            default_placeholder: "https://via.placeholder.com/300x160/2563eb/FFFFFF?text=KOOPAGES"
                .to_string(),
            default_alt: "Imagen de negocio".to_string(),
            lazy_load: true,
        }
    }
}

/// Section navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Known section identifiers, in menu order
    pub sections: Vec<String>,
    /// Section shown when the fragment names none
    pub default_section: String,
    /// Keep the address fragment in sync with the active section
    pub update_url: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sections: vec!["inicio".into(), "negocios".into(), "info".into()],
            default_section: "inicio".to_string(),
            update_url: true,
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub loading: String,
    pub error: String,
    pub success: String,
    pub no_data: String,
    /// Shown instead of an empty card list
    pub no_businesses: String,
    /// Shown when the daily pick has nothing to choose from
    pub no_recommendation: String,
    /// Appended to the title after a successful add
    pub added_successfully: String,
    pub add_failed: String,
    pub invalid_data: String,
    pub clear_search: String,
    /// Live-region text; `{count}` is replaced by the match count
    pub results_announcement: String,
    pub init_failed: String,
    pub load_failed: String,
    pub recommendation_failed: String,
    pub invalid_url: String,
}

impl Messages {
    /// Live-region announcement for a match count
    #[must_use]
    pub fn announce_results(&self, count: usize) -> String {
        self.results_announcement.replace("{count}", &count.to_string())
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            loading: "Cargando...".to_string(),
            error: "Ha ocurrido un error".to_string(),
            success: "Operación exitosa".to_string(),
            no_data: "No hay datos disponibles".to_string(),
            no_businesses: "No hay negocios disponibles en este momento.".to_string(),
            no_recommendation: "No hay negocios disponibles para recomendar hoy.".to_string(),
            added_successfully: "ha sido agregado correctamente".to_string(),
            add_failed: "Error al agregar el negocio".to_string(),
            invalid_data: "Error: Datos inválidos".to_string(),
            clear_search: "Limpiar búsqueda".to_string(),
            results_announcement: "Se encontraron {count} negocios".to_string(),
            init_failed: "Error al inicializar la aplicación".to_string(),
            load_failed: "Error al cargar los negocios".to_string(),
            recommendation_failed: "No se pudo cargar la recomendación del día".to_string(),
            invalid_url: "La dirección del negocio no es válida".to_string(),
        }
    }
}

/// Animation timings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub fade_in_ms: u64,
    /// Delay before a section heading takes focus
    pub focus_delay_ms: u64,
}

impl AnimationConfig {
    #[inline]
    #[must_use]
    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 500,
            focus_delay_ms: 100,
        }
    }
}
