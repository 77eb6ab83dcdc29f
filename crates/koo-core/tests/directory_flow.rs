use koo_core::prelude::*;
use koo_core::{validate, JsonFileStore, NavigationError, NavigationController, RecommendationView};
use koo_test_utils::{aly_salon, date, fixed_picker, placeholder, sample_directory, seeded_rng, started_app};
use pretty_assertions::assert_eq;
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(300);

fn search(app: &mut DirectoryApp, term: &str) -> PageView {
    app.handle(UiEvent::SearchInput(term.to_string()));
    app.advance(DEBOUNCE);
    app.view()
}

#[test]
fn aly_salon_scenario() {
    let mut app = started_app(sample_directory());

    let view = app.view();
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].title, "Aly Salon");
    assert_eq!(view.visible_count(), 1);

    let view = search(&mut app, "peluqueria");
    assert_eq!(view.visible_count(), 1);
    assert!(view.banner.is_none());

    let view = search(&mut app, "inexistente");
    assert_eq!(view.visible_count(), 0);
    let banner = view.banner.expect("banner for a term with no matches");
    assert!(banner.message.contains("inexistente"));

    app.handle(UiEvent::ClearSearch);
    assert_eq!(app.view().visible_count(), 1);
}

#[test]
fn escaped_term_in_banner() {
    let mut app = started_app(sample_directory());
    let view = search(&mut app, "zzz-no-match<b>");
    assert_eq!(view.visible_count(), 0);
    assert_eq!(view.banner.unwrap().term, "zzz-no-match&lt;b&gt;");
}

#[test]
fn daily_pick_is_stable_for_a_day() {
    let records = vec![aly_salon(), placeholder()];
    let picker = fixed_picker(date(2025, 6, 1));
    let mut store = MemoryStore::new();

    let first = picker
        .get_daily(&records, &mut store, &mut seeded_rng(1))
        .unwrap();
    let second = picker
        .get_daily(&records, &mut store, &mut seeded_rng(2))
        .unwrap();

    assert_eq!(first, Some(aly_salon()));
    assert_eq!(first, second);
}

#[test]
fn daily_pick_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let records = Directory::bundled().records().to_vec();
    let picker = fixed_picker(date(2025, 6, 2));

    let first = {
        let mut store = JsonFileStore::open(&path).unwrap();
        picker.get_daily(&records, &mut store, &mut seeded_rng(3)).unwrap()
    };

    let mut reopened = JsonFileStore::open(&path).unwrap();
    for seed in 0..10 {
        let again = picker
            .get_daily(&records, &mut reopened, &mut seeded_rng(seed))
            .unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn no_eligible_records_shows_message() {
    let mut app = started_app(Directory::new(vec![placeholder()]));
    let picker = fixed_picker(date(2025, 6, 3));
    app.load_recommendation(&picker, &mut MemoryStore::new(), &mut seeded_rng(0));

    match app.view().recommendation {
        RecommendationView::Empty { message } => {
            assert_eq!(message, "No hay negocios disponibles para recomendar hoy.");
        }
        other => panic!("unexpected recommendation {other:?}"),
    }
    assert_eq!(
        app.view().empty_message.as_deref(),
        Some("No hay negocios disponibles en este momento.")
    );
}

#[test]
fn title_length_boundary() {
    let mut record = aly_salon();
    record.title = "Al".to_string();
    assert!(!validate(&record).valid);
    record.title = "Aly".to_string();
    assert!(validate(&record).valid);
}

#[test]
fn unknown_section_is_rejected() {
    let config = SiteConfig::default();
    let mut nav = NavigationController::new(&config.navigation, Some("#negocios"));

    let err = nav.navigate("contacto").unwrap_err();
    assert_eq!(err, NavigationError::UnknownSection("contacto".to_string()));
    assert_eq!(nav.active(), "negocios");
    assert_eq!(nav.fragment(), Some("#negocios"));
}
