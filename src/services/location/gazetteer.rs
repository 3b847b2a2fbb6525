//! City recognition against a name index.
//!
//! The built-in index is an embedded list of United States cities, parsed
//! lazily on first use. A GeoNames `cities15000.txt` export can be loaded
//! instead for wider coverage.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static US_CITIES_DATA: &str = include_str!("../../../data/us_cities.txt");

/// Capitalized word runs that may name a place, such as "Houston",
/// "Corpus Christi" or "Winston-Salem".
static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-ZÀ-Ú]+[a-zà-ú]+[ \-]?(?:d[a-u].)?(?:[A-ZÀ-Ú]+[a-zà-ú]+)*")
        .expect("candidate pattern should compile")
});

/// Country names that also appear in city datasets.
const COUNTRY_NAMES: &[&str] = &[
    "andorra",
    "djibouti",
    "georgia",
    "guatemala",
    "kuwait",
    "luxembourg",
    "mexico",
    "monaco",
    "panama",
    "san marino",
    "singapore",
    "vatican city",
];

static BUILTIN: LazyLock<Arc<Gazetteer>> =
    LazyLock::new(|| Arc::new(Gazetteer::from_names(US_CITIES_DATA.lines())));

/// Lowercased city name index.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    cities: HashSet<String>,
}

impl Gazetteer {
    /// Shared instance built from the embedded city list.
    pub fn builtin() -> Arc<Gazetteer> {
        Arc::clone(&BUILTIN)
    }

    /// Build an index from plain names. Blank lines and `#` comments are skipped.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let cities = names
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { cities }
    }

    /// Build an index from GeoNames tab-separated data, using the name column
    /// only. ASCII and alternate names are not indexed.
    pub fn from_geonames(data: &str) -> Self {
        let mut cities = HashSet::new();
        for line in data.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            // 0: geonameid, 1: name, 2: asciiname, 3: alternatenames, ...
            if fields.len() < 3 {
                continue;
            }
            let key = fields[1].trim().to_lowercase();
            if !key.is_empty() {
                cities.insert(key);
            }
        }
        Self { cities }
    }

    /// Load a GeoNames export from disk.
    pub fn load_geonames(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let gazetteer = Self::from_geonames(&data);
        tracing::info!(
            "Loaded {} city names from {}",
            gazetteer.len(),
            path.display()
        );
        Ok(gazetteer)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Whether `name` is a known city, ignoring case. Country names never are.
    pub fn is_city(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.cities.contains(&key) && !COUNTRY_NAMES.contains(&key.as_str())
    }

    /// Cities mentioned in `text`, in order of appearance.
    pub fn cities<'t>(&self, text: &'t str) -> Vec<&'t str> {
        CANDIDATE
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .filter(|candidate| self.is_city(candidate))
            .collect()
    }

    /// First city mentioned in `text`.
    pub fn first_city(&self, text: &str) -> Option<String> {
        self.cities(text).first().map(|c| c.to_string())
    }
}
