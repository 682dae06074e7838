use std::{collections::HashMap, sync::OnceLock};

use serde::{Deserialize, Serialize};

const COUNTRIESDB: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/countries.json"));

/// A country (or territory) assigned a beacon country code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Maritime identification digits used as the 10-bit beacon country code
    pub code: u16,
    pub alpha2: String,
    pub alpha3: String,
    pub name: String,
}

#[derive(Deserialize)]
struct DB {
    #[allow(dead_code)]
    version: String,
    countries: Vec<Country>,
}

/// Country code database.
///
/// The default database is embedded at compile-time and parsed once, on first use.
///
/// # Example
/// ```
/// use sarp::countries;
///
/// let france = countries::lookup(227).unwrap();
/// assert_eq!(france.alpha2, "FR");
/// assert!(countries::lookup(0).is_none());
/// ```
#[derive(Debug)]
pub struct Countries {
    by_code: HashMap<u16, Country>,
}

impl Default for Countries {
    fn default() -> Self {
        let db: DB = serde_json::from_str(COUNTRIESDB).expect("built-in country db is not valid");
        Self {
            by_code: db.countries.into_iter().map(|c| (c.code, c)).collect(),
        }
    }
}

impl Countries {
    #[must_use]
    pub fn lookup(&self, code: u16) -> Option<&Country> {
        self.by_code.get(&code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Process-wide built-in country database.
pub fn builtin() -> &'static Countries {
    static COUNTRIES: OnceLock<Countries> = OnceLock::new();
    COUNTRIES.get_or_init(Countries::default)
}

/// Look up a code in the built-in database.
#[must_use]
pub fn lookup(code: u16) -> Option<&'static Country> {
    builtin().lookup(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let countries = Countries::default();
        assert!(countries.len() > 250);
        let usa = countries.lookup(366).unwrap();
        assert_eq!(usa.alpha2, "US");
        assert_eq!(usa.name, "United States of America");
    }

    #[test]
    fn lookup_miss() {
        assert!(lookup(0).is_none());
        assert!(lookup(1023).is_none());
    }

    #[test]
    fn codes_fit_in_10_bits() {
        for code in builtin().by_code.keys() {
            assert!(*code < 1024, "{code}");
        }
    }
}
