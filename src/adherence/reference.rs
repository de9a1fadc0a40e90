use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{Frequency, ResolutionSource};

use super::types::AdherenceError;

/// Frequency resolved for a medication name, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyResolution {
    pub frequency: Frequency,
    pub source: ResolutionSource,
}

/// Maps a medication name to its dosing frequency.
///
/// Implementations never fail: names they do not know resolve through an
/// explicit fallback and report `ResolutionSource::Fallback`.
pub trait FrequencyResolver {
    fn resolve(&self, medication_name: &str) -> FrequencyResolution;
}

/// Name → frequency table with a fallback for unmapped names.
///
/// Lookups are exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub entries: HashMap<String, Frequency>,
    /// Applied to names missing from `entries`.
    #[serde(default = "default_fallback")]
    pub fallback: Frequency,
}

fn default_fallback() -> Frequency {
    Frequency::Daily
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl FrequencyTable {
    /// Table with the daily fallback.
    pub fn new(entries: HashMap<String, Frequency>) -> Self {
        Self {
            entries,
            fallback: default_fallback(),
        }
    }

    pub fn with_fallback(mut self, fallback: Frequency) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn insert(&mut self, medication_name: &str, frequency: Frequency) {
        self.entries.insert(medication_name.into(), frequency);
    }

    /// Common IBD maintenance therapies, brand and generic names.
    pub fn ibd_defaults() -> Self {
        let entries: [(&str, Frequency); 24] = [
            ("Mesalamine", Frequency::Daily),
            ("Lialda", Frequency::Daily),
            ("Asacol", Frequency::TwiceDaily),
            ("Pentasa", Frequency::TwiceDaily),
            ("Sulfasalazine", Frequency::TwiceDaily),
            ("Budesonide", Frequency::Daily),
            ("Entocort", Frequency::Daily),
            ("Prednisone", Frequency::Daily),
            ("Azathioprine", Frequency::Daily),
            ("Mercaptopurine", Frequency::Daily),
            ("Methotrexate", Frequency::Weekly),
            ("Tofacitinib", Frequency::TwiceDaily),
            ("Xeljanz", Frequency::TwiceDaily),
            ("Upadacitinib", Frequency::Daily),
            ("Rinvoq", Frequency::Daily),
            ("Adalimumab", Frequency::BiWeekly),
            ("Humira", Frequency::BiWeekly),
            ("Certolizumab", Frequency::Custom(28)),
            ("Infliximab", Frequency::Custom(56)),
            ("Remicade", Frequency::Custom(56)),
            ("Vedolizumab", Frequency::Custom(56)),
            ("Entyvio", Frequency::Custom(56)),
            ("Ustekinumab", Frequency::Custom(56)),
            ("Stelara", Frequency::Custom(56)),
        ];
        Self::new(
            entries
                .into_iter()
                .map(|(name, freq)| (name.to_string(), freq))
                .collect(),
        )
    }

    /// Parse a table from JSON: `{"entries": {"Humira": "bi_weekly", ...}, "fallback": "daily"}`.
    pub fn from_json(json: &str) -> Result<Self, AdherenceError> {
        serde_json::from_str(json)
            .map_err(|e| AdherenceError::ReferenceDataParse("frequency table".into(), e.to_string()))
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AdherenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AdherenceError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        let table = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            entries = table.entries.len(),
            "Loaded frequency table"
        );
        Ok(table)
    }
}

impl FrequencyResolver for FrequencyTable {
    fn resolve(&self, medication_name: &str) -> FrequencyResolution {
        match self.entries.get(medication_name) {
            Some(&frequency) => FrequencyResolution {
                frequency,
                source: ResolutionSource::Mapped,
            },
            None => FrequencyResolution {
                frequency: self.fallback,
                source: ResolutionSource::Fallback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn known_name_is_mapped() {
        let table = FrequencyTable::ibd_defaults();
        let res = table.resolve("Humira");
        assert_eq!(res.frequency, Frequency::BiWeekly);
        assert_eq!(res.source, ResolutionSource::Mapped);
    }

    #[test]
    fn unknown_name_falls_back_to_daily() {
        let table = FrequencyTable::ibd_defaults();
        let res = table.resolve("Vitamin D");
        assert_eq!(res.frequency, Frequency::Daily);
        assert_eq!(res.source, ResolutionSource::Fallback);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = FrequencyTable::ibd_defaults();
        assert_eq!(table.resolve("humira").source, ResolutionSource::Fallback);
    }

    #[test]
    fn custom_fallback_is_honoured() {
        let table = FrequencyTable::default().with_fallback(Frequency::AsNeeded);
        assert_eq!(table.resolve("Ibuprofen").frequency, Frequency::AsNeeded);
    }

    #[test]
    fn insert_overrides_default_entry() {
        let mut table = FrequencyTable::ibd_defaults();
        table.insert("Stelara", Frequency::Custom(28));
        assert_eq!(table.resolve("Stelara").frequency, Frequency::Custom(28));
    }

    #[test]
    fn json_table_parses_all_shapes() {
        let table = FrequencyTable::from_json(
            r#"{"entries": {"Humira": "bi_weekly", "Stelara": {"custom": 56}, "Ibuprofen": "as_needed"}}"#,
        )
        .unwrap();
        assert_eq!(table.resolve("Stelara").frequency, Frequency::Custom(56));
        assert_eq!(table.resolve("Ibuprofen").frequency, Frequency::AsNeeded);
        assert_eq!(table.fallback, Frequency::Daily);
    }

    #[test]
    fn json_table_rejects_zero_interval() {
        let err = FrequencyTable::from_json(r#"{"entries": {"X": {"custom": 0}}}"#).unwrap_err();
        assert!(matches!(err, AdherenceError::ReferenceDataParse(..)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"entries": {{"Methotrexate": "weekly"}}, "fallback": "twice_daily"}}"#
        )
        .unwrap();

        let table = FrequencyTable::load(file.path()).unwrap();
        assert_eq!(table.resolve("Methotrexate").frequency, Frequency::Weekly);
        assert_eq!(table.resolve("Other").frequency, Frequency::TwiceDaily);
    }

    #[test]
    fn load_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FrequencyTable::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, AdherenceError::ReferenceDataLoad(..)));
    }
}
