//! Testing utilities for KOOPAGES workspace
//!
//! Shared fixtures: sample records, seeded randomness, pinned clocks and
//! throwaway site directories.

#![allow(missing_docs)]

use chrono::NaiveDate;
use koo_core::{BusinessRecord, Directory, DirectoryApp, FixedClock, RecommendationPicker, SiteConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tempfile::TempDir;

pub fn aly_salon() -> BusinessRecord {
    BusinessRecord::new(
        "Aly Salon",
        "Servicios profesionales de peluquería, manicure y tratamientos de belleza.",
        "https://spoo.me/aly_salon",
        "https://via.placeholder.com/300x160/FF0000/FFFFFF?text=Aly+Salon",
        "Servicio",
    )
}

pub fn placeholder() -> BusinessRecord {
    BusinessRecord::placeholder(
        "Proximamente",
        "Tu negocio puede aparecer aquí muy pronto.",
        "https://via.placeholder.com/300x160/2563eb/FFFFFF?text=Proximamente",
        "General",
    )
}

/// Valid record with a generated slug
pub fn sample_record(title: &str) -> BusinessRecord {
    let slug: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    BusinessRecord::new(
        title,
        format!("Negocio de prueba llamado {title}."),
        format!("https://spoo.me/{slug}"),
        format!("https://via.placeholder.com/300x160?text={slug}"),
        "Prueba",
    )
}

/// One real business plus the placeholder
pub fn sample_directory() -> Directory {
    Directory::new(vec![aly_salon(), placeholder()])
}

/// Initialized controller over `directory` with default config
pub fn started_app(directory: Directory) -> DirectoryApp {
    let mut app = DirectoryApp::new(SiteConfig::default(), directory);
    app.initialize(None);
    app
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn fixed_picker(date: NaiveDate) -> RecommendationPicker<FixedClock> {
    RecommendationPicker::new(FixedClock(date))
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Write `files` (relative path, contents) under a fresh temp dir
pub fn site_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        write_file(dir.path(), name, contents);
    }
    dir
}

pub fn write_file(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="description" content="Directorio de negocios patrocinados">
<meta name="keywords" content="negocios, directorio">
<meta property="og:title" content="KOOPAGES">
<meta name="twitter:card" content="summary">
<link rel="canonical" href="https://koopages.example/">
<title>KOOPAGES</title>
</head>
<body>
<a class="skip-link" href="#main">Saltar al contenido</a>
<nav role="navigation" aria-label="Principal"><svg aria-hidden="true"></svg></nav>
<main id="main"><div id="websList" role="list"></div></main>
</body>
</html>
"##;

pub const NOT_FOUND_HTML: &str = "<!DOCTYPE html><html lang=\"es\"><body><h1>Página no encontrada</h1></body></html>\n";

pub const ICONS_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><symbol id="logo"></symbol><symbol id="menu"></symbol><symbol id="search"></symbol><symbol id="external-link"></symbol></svg>"#;

/// Public directory that passes every site check
pub fn valid_site() -> TempDir {
    site_dir(&[
        ("index.html", INDEX_HTML),
        ("404.html", NOT_FOUND_HTML),
        ("styles-lite.css", ":root { --primary-color: #2563eb; }\n"),
        ("icons.svg", ICONS_SVG),
        ("robots.txt", "User-agent: *\nAllow: /\n"),
    ])
}
