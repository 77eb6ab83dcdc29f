//! Text helpers: escaping, URL checks and search normalization

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use url::Url;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Escape `& < > " ' /` for safe inclusion in markup
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

/// Check that `input` parses as an absolute http or https URL
#[must_use]
pub fn is_valid_url(input: &str) -> bool {
    parse_web_url(input).is_some()
}

/// Parse an http/https URL, rejecting every other scheme
#[must_use]
pub fn parse_web_url(input: &str) -> Option<Url> {
    if input.is_empty() {
        return None;
    }
    Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Normalize text for search matching
///
/// Lower-cases, decomposes (NFD), drops combining diacritical marks
/// (U+0300..=U+036F) and trims surrounding whitespace, so `"Peluquería "`
/// and `"peluqueria"` compare equal.
#[must_use]
pub fn normalize_search(input: &str) -> String {
    let folded: String = input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect();
    folded.trim().to_string()
}

#[inline]
fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Cut `text` to `length` characters and append `suffix`
///
/// Text that already fits is returned unchanged.
#[must_use]
pub fn truncate(text: &str, length: usize, suffix: &str) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let head: String = text.chars().take(length).collect();
    format!("{}{}", head.trim(), suffix)
}

/// Loose email shape check (`local@domain.tld`)
#[must_use]
pub fn is_valid_email(input: &str) -> bool {
    !input.is_empty() && EMAIL.is_match(input)
}

/// WCAG contrast ratio between two `#rrggbb` colours
///
/// Returns `None` if either colour is not a six-digit hex value.
#[must_use]
pub fn contrast_ratio(first: &str, second: &str) -> Option<f64> {
    let a = relative_luminance(first)?;
    let b = relative_luminance(second)?;
    let (bright, dark) = if a >= b { (a, b) } else { (b, a) };
    Some((bright + 0.05) / (dark + 0.05))
}

fn relative_luminance(hex: &str) -> Option<f64> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let rgb = u32::from_str_radix(digits, 16).ok()?;
    let channel = |shift: u32| {
        let c = f64::from((rgb >> shift) & 0xff) / 255.0;
        if c <= 0.039_28 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Some(0.2126 * channel(16) + 0.7152 * channel(8) + 0.0722 * channel(0))
}
