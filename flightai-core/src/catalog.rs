// flightai-core/src/catalog.rs

//! Static city → return-ticket price table.

use std::collections::BTreeMap;
use tracing::info;

/// Returned by [`PriceCatalog::lookup`] for cities the catalog does not know.
pub const UNKNOWN_PRICE: &str = "Unknown";

const DEFAULT_PRICES: [(&str, &str); 5] = [
    ("london", "$799"),
    ("paris", "$899"),
    ("tokyo", "$1400"),
    ("berlin", "$499"),
    ("new york", "$950"),
];

/// Read-only price table keyed by lowercased city name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCatalog {
    prices: BTreeMap<String, String>,
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::from_entries(DEFAULT_PRICES)
    }
}

impl PriceCatalog {
    /// Builds a catalog from `(city, price)` pairs. City keys are normalized
    /// the same way lookups are.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let prices = entries
            .into_iter()
            .map(|(city, price)| (normalize(city.as_ref()), price.into()))
            .collect();
        Self { prices }
    }

    /// Price for `city`, or [`UNKNOWN_PRICE`]. Case-insensitive; never fails.
    pub fn lookup(&self, city: &str) -> String {
        info!(city = %city, "Price lookup requested for {}", city);
        self.prices
            .get(&normalize(city))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_PRICE.to_string())
    }

    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

fn normalize(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_cities_any_case() {
        let catalog = PriceCatalog::default();
        assert_eq!(catalog.lookup("Berlin"), "$499");
        assert_eq!(catalog.lookup("BERLIN"), "$499");
        assert_eq!(catalog.lookup("tOkYo"), "$1400");
        assert_eq!(catalog.lookup("New York"), "$950");
        assert_eq!(catalog.lookup("  paris "), "$899");
    }

    #[test]
    fn test_lookup_unknown_returns_sentinel() {
        let catalog = PriceCatalog::default();
        assert_eq!(catalog.lookup("Atlantis"), UNKNOWN_PRICE);
        assert_eq!(catalog.lookup(""), UNKNOWN_PRICE);
        assert_eq!(catalog.lookup("newyork"), UNKNOWN_PRICE);
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let catalog = PriceCatalog::default();
        let before = catalog.clone();
        assert_eq!(catalog.lookup("London"), catalog.lookup("London"));
        assert_eq!(catalog.lookup("Nowhere"), catalog.lookup("Nowhere"));
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_from_entries_normalizes_keys() {
        let catalog = PriceCatalog::from_entries([("Rome", "$650"), ("  Oslo", "$720")]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("rome"), "$650");
        assert_eq!(catalog.lookup("OSLO"), "$720");
        assert_eq!(catalog.cities().collect::<Vec<_>>(), vec!["oslo", "rome"]);
        assert_eq!(catalog.lookup("Berlin"), UNKNOWN_PRICE);
    }
}
