//! Static site asset check
//!
//! Each check collects every failure it finds rather than stopping at the
//! first one. A missing file fails every check that reads it.

use koo_core::validation::validate_with;
use koo_core::{Directory, ValidationRules};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Files the site cannot be served without
pub const REQUIRED_FILES: &[&str] = &[
    "index.html",
    "styles-lite.css",
    "icons.svg",
    "robots.txt",
    "404.html",
];

/// Upper size bounds in bytes; listed files must also be non-empty
pub const SIZE_LIMITS: &[(&str, u64)] = &[
    ("index.html", 50_000),
    ("styles-lite.css", 50_000),
    ("script.js", 100_000),
];

/// Outcome of one named check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCheck {
    pub name: &'static str,
    pub errors: Vec<String>,
}

impl SiteCheck {
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// All checks for one site root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub checks: Vec<SiteCheck>,
}

impl SiteReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed() == 0
    }

    /// One ✓/✗ line per check, errors indented, then a summary
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for check in &self.checks {
            let mark = if check.passed() { '✓' } else { '✗' };
            let _ = writeln!(out, "{mark} {}", check.name);
            for error in &check.errors {
                let _ = writeln!(out, "  error: {error}");
            }
        }
        let _ = writeln!(
            out,
            "\n{} checks, {} passed, {} failed",
            self.checks.len(),
            self.passed(),
            self.failed()
        );
        if self.is_ok() {
            out.push_str("✓ All checks passed\n");
        } else {
            out.push_str("✗ Some checks failed\n");
        }
        out
    }
}

/// Check the site under `root` and every record of `directory`
#[must_use]
pub fn check_site(root: &Path, directory: &Directory, rules: &ValidationRules) -> SiteReport {
    let index = read(root, "index.html");
    let robots = read(root, "robots.txt");
    let icons = read(root, "icons.svg");

    let checks = vec![
        SiteCheck {
            name: "required files exist",
            errors: REQUIRED_FILES
                .iter()
                .filter(|f| !root.join(f).is_file())
                .map(|f| format!("missing file: {f}"))
                .collect(),
        },
        contains_all(
            "HTML has a valid structure",
            "index.html",
            &index,
            &[
                ("<!DOCTYPE html>", "missing DOCTYPE"),
                (r#"<html lang="es">"#, "missing lang attribute"),
                (r#"<meta charset="UTF-8">"#, "missing charset"),
                (r#"<meta name="viewport""#, "missing viewport"),
                ("<title>", "missing title"),
            ],
        ),
        contains_all(
            "SEO meta tags are present",
            "index.html",
            &index,
            &[
                (r#"meta name="description""#, "missing meta description"),
                (r#"meta name="keywords""#, "missing meta keywords"),
                (r#"meta property="og:"#, "missing Open Graph tags"),
                (r#"meta name="twitter:"#, "missing Twitter Card tags"),
                (r#"link rel="canonical""#, "missing canonical URL"),
            ],
        ),
        contains_all(
            "accessibility attributes are present",
            "index.html",
            &index,
            &[
                ("role=", "missing ARIA roles"),
                ("aria-label", "missing aria-label"),
                ("aria-hidden", "missing aria-hidden"),
                ("skip-link", "missing skip link"),
            ],
        ),
        contains_all(
            "robots.txt is configured",
            "robots.txt",
            &robots,
            &[
                ("User-agent:", "missing User-agent"),
                ("Allow:", "missing Allow"),
            ],
        ),
        contains_all(
            "SVG icons are defined",
            "icons.svg",
            &icons,
            &[
                ("<svg", "not an SVG file"),
                ("symbol id=", "missing symbols"),
                ("logo", "missing logo icon"),
                ("menu", "missing menu icon"),
                ("search", "missing search icon"),
            ],
        ),
        SiteCheck {
            name: "files have reasonable sizes",
            errors: size_errors(root),
        },
        SiteCheck {
            name: "files are UTF-8",
            errors: ["index.html", "404.html"]
                .iter()
                .filter_map(|f| read(root, f).err())
                .collect(),
        },
        SiteCheck {
            name: "directory records are valid",
            errors: record_errors(directory, rules),
        },
    ];

    let report = SiteReport { checks };
    tracing::info!(
        "Site check of {}: {} passed, {} failed",
        root.display(),
        report.passed(),
        report.failed()
    );
    report
}

fn read(root: &Path, name: &str) -> Result<String, String> {
    std::fs::read_to_string(root.join(name)).map_err(|e| format!("cannot read {name}: {e}"))
}

fn contains_all(
    name: &'static str,
    file: &str,
    content: &Result<String, String>,
    needles: &[(&str, &str)],
) -> SiteCheck {
    let errors = match content {
        Ok(text) => needles
            .iter()
            .filter(|(needle, _)| !text.contains(needle))
            .map(|(_, message)| format!("{file}: {message}"))
            .collect(),
        Err(e) => vec![e.clone()],
    };
    SiteCheck { name, errors }
}

fn size_errors(root: &Path) -> Vec<String> {
    let mut errors = Vec::new();
    for (file, max) in SIZE_LIMITS {
        let Ok(meta) = std::fs::metadata(root.join(file)) else {
            // script.js is optional; required files are reported above
            continue;
        };
        if meta.len() == 0 {
            errors.push(format!("{file} is empty"));
        } else if meta.len() >= *max {
            errors.push(format!("{file} is too large ({} bytes)", meta.len()));
        }
    }
    errors
}

fn record_errors(directory: &Directory, rules: &ValidationRules) -> Vec<String> {
    directory
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_placeholder())
        .filter_map(|(i, r)| {
            let report = validate_with(r, rules);
            (!report.valid).then(|| format!("record {i} ({}): {}", r.title, report.errors.join("; ")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_text_marks_failures() {
        let report = SiteReport {
            checks: vec![
                SiteCheck {
                    name: "one",
                    errors: vec![],
                },
                SiteCheck {
                    name: "two",
                    errors: vec!["bad".into()],
                },
            ],
        };
        let text = report.to_text();
        assert!(text.contains("✓ one"));
        assert!(text.contains("✗ two"));
        assert!(text.contains("  error: bad"));
        assert!(text.contains("2 checks, 1 passed, 1 failed"));
        assert!(!report.is_ok());
    }

    #[test]
    fn missing_root_fails_file_checks() {
        let report = check_site(
            Path::new("/nonexistent-koopages-site"),
            &Directory::bundled(),
            &ValidationRules::default(),
        );
        assert_eq!(report.checks[0].errors.len(), REQUIRED_FILES.len());
        assert!(report.checks.last().unwrap().passed());
        assert!(!report.is_ok());
    }
}
