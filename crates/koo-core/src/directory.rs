//! Directory data store
//!
//! Ordered, in-memory list of business records. Loaded once at startup from
//! the bundled list, a JSON file or the remote listing; `append` is the only
//! runtime mutation.

use crate::error::DirectoryError;
use crate::record::BusinessRecord;
use crate::validation::{validate_with, ValidationRules};
use serde::Deserialize;
use std::path::Path;

/// Ordered collection of business records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    records: Vec<BusinessRecord>,
}

/// Accepted JSON layouts for directory data
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectoryData {
    List(Vec<BusinessRecord>),
    Envelope { data: Vec<BusinessRecord> },
}

impl Directory {
    /// Create directory from records
    #[inline]
    #[must_use]
    pub fn new(records: Vec<BusinessRecord>) -> Self {
        Self { records }
    }

    /// Directory with the bundled business list
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(bundled_records())
    }

    /// Parse a JSON record list or a `{ "data": [...] }` listing envelope
    pub fn from_json_str(text: &str) -> Result<Self, DirectoryError> {
        let records = match serde_json::from_str::<DirectoryData>(text)? {
            DirectoryData::List(records) | DirectoryData::Envelope { data: records } => records,
        };
        Ok(Self::new(records))
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json_str(&text)?;
        tracing::debug!(
            "Loaded {} records from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    /// All records in insertion order, placeholders included
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records eligible for display and recommendation
    pub fn eligible(&self) -> impl Iterator<Item = &BusinessRecord> {
        self.records.iter().filter(|r| !r.is_placeholder())
    }

    /// Distinct categories of valid, non-placeholder records, first-seen order
    #[must_use]
    pub fn categories(&self, rules: &ValidationRules) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for record in self.eligible() {
            if !validate_with(record, rules).valid {
                continue;
            }
            if !seen.iter().any(|c| c == &record.category) {
                seen.push(record.category.clone());
            }
        }
        seen
    }

    /// Validate and append a record
    ///
    /// Fields are trimmed before validation. On failure the directory is
    /// unchanged.
    pub fn append(
        &mut self,
        record: BusinessRecord,
        rules: &ValidationRules,
    ) -> Result<&BusinessRecord, DirectoryError> {
        let record = record.trimmed();
        let report = validate_with(&record, rules);
        if !report.valid {
            tracing::error!("Rejected new record {:?}: {:?}", record.title, report.errors);
            return Err(DirectoryError::InvalidRecord {
                errors: report.errors,
            });
        }
        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }
}

impl From<Vec<BusinessRecord>> for Directory {
    fn from(records: Vec<BusinessRecord>) -> Self {
        Self::new(records)
    }
}

fn sponsor(title: &str, description: &str, slug: &str, color: &str, category: &str) -> BusinessRecord {
    let label = title.replace(' ', "+");
    BusinessRecord::new(
        title,
        description,
        format!("https://spoo.me/{slug}"),
        format!("https://via.placeholder.com/300x160/{color}/FFFFFF?text={label}"),
        category,
    )
}

/// Bundled business list, used when no data file or remote listing is available
#[must_use]
pub fn bundled_records() -> Vec<BusinessRecord> {
    vec![
        sponsor(
            "Tienda Iyawo",
            "Ropa, accesorios y artículos religiosos con envío a domicilio en toda La Habana.",
            "sv1",
            "4285F4",
            "Tienda",
        ),
        sponsor(
            "Aly Salon",
            "Servicios profesionales de peluquería, manicure y tratamientos de belleza.",
            "aly_salon",
            "FF0000",
            "Servicio",
        ),
        sponsor(
            "Tienda de Todo un Poco",
            "Productos para el hogar, aseo personal y alimentos de primera necesidad.",
            "sv3",
            "636466",
            "Tienda",
        ),
        sponsor(
            "Cárnicos Habana",
            "Carnes frescas, embutidos y productos cárnicos de calidad al mejor precio.",
            "sv4",
            "24292e",
            "Alimentos",
        ),
        sponsor(
            "Suri Nails",
            "Diseño de uñas, esmaltado permanente y cuidado de manos y pies.",
            "sv5",
            "1DA1F2",
            "Servicio",
        ),
        sponsor(
            "Tienda de Electrodomésticos",
            "Electrodomésticos nuevos con garantía: refrigeradores, ventiladores, ollas y más.",
            "sv6",
            "E50914",
            "Tienda",
        ),
        BusinessRecord::placeholder(
            "Proximamente",
            "Tu negocio puede aparecer aquí muy pronto.",
            "https://via.placeholder.com/300x160/2563eb/FFFFFF?text=Proximamente",
            "General",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn bundled_records_are_valid_except_placeholder() {
        let directory = Directory::bundled();
        for record in directory.records() {
            if record.is_placeholder() {
                continue;
            }
            let report = validate(record);
            assert!(report.valid, "{}: {:?}", record.title, report.errors);
        }
        assert_eq!(directory.eligible().count(), directory.len() - 1);
    }

    #[test]
    fn parses_list_and_envelope() {
        let list = r#"[{"title":"Aly Salon","description":"Servicios de peluquería","url":"https://spoo.me/aly_salon","image":"img","category":"Servicio"}]"#;
        assert_eq!(Directory::from_json_str(list).unwrap().len(), 1);

        let envelope = format!(r#"{{"success":true,"data":{list},"timestamp":"2025-01-01T00:00:00Z"}}"#);
        assert_eq!(Directory::from_json_str(&envelope).unwrap().len(), 1);

        assert!(Directory::from_json_str("{\"nope\":1}").is_err());
    }

    #[test]
    fn append_validates_and_trims() {
        let mut directory = Directory::default();
        let rules = ValidationRules::default();

        let added = directory
            .append(
                BusinessRecord::new(
                    "  Nueva Tienda ",
                    "Una tienda nueva en el barrio",
                    "https://spoo.me/nueva",
                    "img",
                    "Tienda",
                ),
                &rules,
            )
            .unwrap();
        assert_eq!(added.title, "Nueva Tienda");

        let err = directory
            .append(BusinessRecord::new("No", "corta", "#", "", ""), &rules)
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidRecord { .. }));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn categories_are_distinct_in_order() {
        let categories = Directory::bundled().categories(&ValidationRules::default());
        assert_eq!(categories, vec!["Tienda", "Servicio", "Alimentos"]);
    }
}
