//! Daily recommendation
//!
//! One record per UTC calendar day. The pick is stored under two keys:
//! `dailyRecommendationDate` (`YYYY-MM-DD`) and `dailyRecommendationWeb`
//! (the record as JSON). A stored pick is reused only if it is for today and
//! still decodes to a valid, non-placeholder record. The record key is
//! written first so a stored date never outlives a failed record write.

use crate::error::{RecommendError, StoreError};
use crate::record::{BusinessRecord, DailyRecommendation};
use crate::store::KeyValueStore;
use crate::validation::{validate_with, ValidationRules};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::sync::Arc;

/// Store key holding the date of the last pick
pub const DATE_KEY: &str = "dailyRecommendationDate";

/// Store key holding the JSON-encoded record of the last pick
pub const RECORD_KEY: &str = "dailyRecommendationWeb";

/// Source of the current calendar date
pub trait Clock {
    /// Today's date
    fn today(&self) -> NaiveDate;
}

/// UTC wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// `YYYY-MM-DD` form of a date
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Read the stored pick
///
/// A record that fails to decode is logged and reported as absent.
pub fn load_persisted<S: KeyValueStore + ?Sized>(
    store: &S,
) -> Result<Option<DailyRecommendation>, StoreError> {
    let Some(date) = store.get(DATE_KEY)? else {
        return Ok(None);
    };
    let Some(raw) = store.get(RECORD_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<BusinessRecord>(&raw) {
        Ok(record) => Ok(Some(DailyRecommendation { date, record })),
        Err(e) => {
            tracing::warn!("Discarding malformed stored recommendation: {}", e);
            Ok(None)
        }
    }
}

/// Write both keys of a pick
pub fn persist<S: KeyValueStore + ?Sized>(
    store: &mut S,
    pick: &DailyRecommendation,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(&pick.record).map_err(|source| StoreError::Encode {
        key: RECORD_KEY.to_string(),
        source,
    })?;
    if let Err(e) = store.set(RECORD_KEY, encoded) {
        // the old date must not vouch for whatever the record key now holds
        if let Err(cleanup) = store.remove(DATE_KEY) {
            tracing::warn!("Failed to drop stale recommendation date: {}", cleanup);
        }
        return Err(e);
    }
    store.set(DATE_KEY, pick.date.clone())
}

/// Picks and remembers the recommendation of the day
#[derive(Debug, Clone)]
pub struct RecommendationPicker<C> {
    clock: C,
    rules: ValidationRules,
}

impl<C: Clock> RecommendationPicker<C> {
    /// Create picker on a clock
    #[inline]
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            rules: ValidationRules::default(),
        }
    }

    /// With record validation rules
    #[inline]
    #[must_use]
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Date the picker considers today
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Recommendation for today
    ///
    /// Returns `Ok(None)` when no valid non-placeholder record exists.
    pub fn get_daily<S, R>(
        &self,
        records: &[BusinessRecord],
        store: &mut S,
        rng: &mut R,
    ) -> Result<Option<BusinessRecord>, RecommendError>
    where
        S: KeyValueStore + ?Sized,
        R: Rng + ?Sized,
    {
        get_daily_on(self.clock.today(), records, &self.rules, store, rng)
    }
}

/// Whether a record may be recommended
#[must_use]
pub fn is_eligible(record: &BusinessRecord, rules: &ValidationRules) -> bool {
    !record.is_placeholder() && validate_with(record, rules).valid
}

/// Recommendation for an explicit date
pub fn get_daily_on<S, R>(
    today: NaiveDate,
    records: &[BusinessRecord],
    rules: &ValidationRules,
    store: &mut S,
    rng: &mut R,
) -> Result<Option<BusinessRecord>, RecommendError>
where
    S: KeyValueStore + ?Sized,
    R: Rng + ?Sized,
{
    let today = date_key(today);

    if let Some(stored) = load_persisted(store)? {
        if stored.date == today && is_eligible(&stored.record, rules) {
            tracing::debug!("Reusing recommendation for {}: {}", today, stored.record.title);
            return Ok(Some(stored.record));
        }
    }

    let eligible: Vec<&BusinessRecord> = records.iter().filter(|r| is_eligible(r, rules)).collect();
    if eligible.is_empty() {
        tracing::debug!("No eligible records to recommend on {}", today);
        return Ok(None);
    }

    let record = eligible[rng.random_range(0..eligible.len())].clone();
    persist(
        store,
        &DailyRecommendation {
            date: today.clone(),
            record: record.clone(),
        },
    )?;
    tracing::info!("Recommendation for {}: {}", today, record.title);
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn same_day_returns_same_record() {
        let records = Directory::bundled().records().to_vec();
        let mut store = MemoryStore::new();
        let picker = RecommendationPicker::new(FixedClock(day(1)));

        let first = picker
            .get_daily(&records, &mut store, &mut StdRng::seed_from_u64(1))
            .unwrap();
        for seed in 2..20 {
            let again = picker
                .get_daily(&records, &mut store, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(store.get(DATE_KEY).unwrap().as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn never_picks_placeholder() {
        let records = Directory::bundled().records().to_vec();
        for seed in 0..200 {
            let mut store = MemoryStore::new();
            let pick = get_daily_on(day(2), &records, &rules(), &mut store, &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .unwrap();
            assert!(!pick.is_placeholder());
        }
    }

    #[test]
    fn no_eligible_records_gives_none() {
        let records = vec![BusinessRecord::placeholder("Proximamente", "Muy pronto", "img", "General")];
        let mut store = MemoryStore::new();
        let pick = get_daily_on(day(3), &records, &rules(), &mut store, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(pick.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn new_day_recomputes() {
        let only = BusinessRecord::new("Aly Salon", "Peluquería y belleza", "https://spoo.me/aly_salon", "img", "Servicio");
        let mut store = MemoryStore::new();
        store.set(DATE_KEY, "2025-03-01".to_string()).unwrap();
        store
            .set(RECORD_KEY, r#"{"title":"Viejo","description":"x","url":"https://a.b","image":"i","category":"c"}"#.to_string())
            .unwrap();

        let pick = get_daily_on(day(4), std::slice::from_ref(&only), &rules(), &mut store, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(pick, Some(only));
        assert_eq!(store.get(DATE_KEY).unwrap().as_deref(), Some("2025-03-04"));
    }

    #[test]
    fn malformed_or_placeholder_state_is_replaced() {
        let only = BusinessRecord::new("Suri Nails", "Diseño de uñas", "https://spoo.me/sv5", "img", "Servicio");

        for stored in ["{not json", r##"{"title":"Proximamente","url":"#"}"##] {
            let mut store = MemoryStore::new();
            store.set(DATE_KEY, "2025-03-05".to_string()).unwrap();
            store.set(RECORD_KEY, stored.to_string()).unwrap();

            let pick = get_daily_on(day(5), std::slice::from_ref(&only), &rules(), &mut store, &mut StdRng::seed_from_u64(0))
                .unwrap();
            assert_eq!(pick.as_ref(), Some(&only));
        }
    }

    #[test]
    fn invalid_records_are_never_picked() {
        let broken = BusinessRecord::new("No", "", "javascript:alert(1)", "", "");
        let mut store = MemoryStore::new();
        let pick = get_daily_on(day(6), std::slice::from_ref(&broken), &rules(), &mut store, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(pick.is_none());
        assert!(store.is_empty());

        let good = BusinessRecord::new("Aly Salon", "Peluquería y belleza", "https://spoo.me/aly_salon", "img", "Servicio");
        let records = vec![broken.clone(), good.clone()];
        for seed in 0..50 {
            let mut store = MemoryStore::new();
            let pick = get_daily_on(day(6), &records, &rules(), &mut store, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(pick.as_ref(), Some(&good));
        }
    }

    #[test]
    fn stored_invalid_record_is_replaced() {
        let good = BusinessRecord::new("Suri Nails", "Diseño de uñas", "https://spoo.me/sv5", "img", "Servicio");
        let mut store = MemoryStore::new();
        store.set(DATE_KEY, "2025-03-07".to_string()).unwrap();
        store
            .set(RECORD_KEY, r#"{"title":"No","description":"","url":"javascript:alert(1)","image":"","category":""}"#.to_string())
            .unwrap();

        let pick = get_daily_on(day(7), std::slice::from_ref(&good), &rules(), &mut store, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(pick, Some(good));
    }

    #[test]
    fn picker_uses_its_rules() {
        let short = BusinessRecord::new("Aly", "Peluquería y belleza", "https://spoo.me/aly", "img", "Servicio");
        let strict = ValidationRules {
            title: crate::validation::LengthRule::new(5, 100),
            ..ValidationRules::default()
        };
        let picker = RecommendationPicker::new(FixedClock(day(8))).with_rules(strict);
        let pick = picker
            .get_daily(std::slice::from_ref(&short), &mut MemoryStore::new(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(pick.is_none());
    }

    /// Memory store whose writes to one key always fail
    struct FailingKey {
        inner: MemoryStore,
        key: &'static str,
    }

    impl KeyValueStore for FailingKey {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
            if key == self.key {
                return Err(StoreError::Io {
                    path: "state.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.remove(key)
        }

        fn clear(&mut self) -> Result<(), StoreError> {
            self.inner.clear()
        }
    }

    #[test]
    fn failed_record_write_does_not_keep_old_pick() {
        let old = BusinessRecord::new("Viejo Negocio", "Negocio del día anterior", "https://spoo.me/viejo", "img", "Servicio");
        let fresh = BusinessRecord::new("Nuevo Negocio", "Negocio del día siguiente", "https://spoo.me/nuevo", "img", "Servicio");

        let mut store = FailingKey {
            inner: MemoryStore::new(),
            key: "none",
        };
        let first = get_daily_on(day(10), std::slice::from_ref(&old), &rules(), &mut store, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(first.as_ref(), Some(&old));

        store.key = RECORD_KEY;
        let err = get_daily_on(day(11), std::slice::from_ref(&fresh), &rules(), &mut store, &mut StdRng::seed_from_u64(0));
        assert!(err.is_err());
        assert_eq!(store.get(DATE_KEY).unwrap(), None);

        store.key = "none";
        let retry = get_daily_on(day(11), std::slice::from_ref(&fresh), &rules(), &mut store, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(retry, Some(fresh));
        assert_eq!(store.get(DATE_KEY).unwrap().as_deref(), Some("2025-03-11"));
    }

    #[test]
    fn date_key_format() {
        assert_eq!(date_key(day(9)), "2025-03-09");
    }
}
