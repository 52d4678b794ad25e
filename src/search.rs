//! Search filter options and their wire-parameter preparation.
//!
//! The search form submits a fixed parameter set; everything the caller does
//! not override goes out with the site's own defaults. Filter values are
//! enums so invalid genders/continents are unrepresentable; country codes
//! stay free-form strings validated shallowly (the site's own list is the
//! authority).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use thiserror::Error;

use crate::params::Params;

/// The "looking for" flags the search form always submits.
const LOOKING_FOR_FLAGS: [&str; 6] = [
    "lfor_email",
    "lfor_snail",
    "lfor_langex",
    "lfor_friend",
    "lfor_flirt",
    "lfor_relation",
];

/// Placeholder the site uses for "any country" / "any language".
const ANY: &str = "---";

/// Gender filter values accepted by the search form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Continent codes accepted by the search form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Continent {
    Af,
    As,
    Eu,
    Na,
    Oc,
    Sa,
}

impl Continent {
    /// All six continents, the form's default selection.
    pub fn all() -> Vec<Continent> {
        use Continent::*;
        vec![Af, As, Eu, Na, Oc, Sa]
    }
}

/// Result ordering accepted by the search form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    LastLogin,
    NewestFirst,
}

/// Validation failures for caller-supplied search filters.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OptionsError {
    #[error("age2 ({age2}) cannot be less than age1 ({age1})")]
    AgeRange { age1: u8, age2: u8 },

    #[error("invalid country code: {0}")]
    Country(String),
}

/// Caller-facing search filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub age1: u8,
    pub age2: u8,
    pub sex: Vec<Sex>,
    pub continents: Vec<Continent>,
    /// ISO country codes, or `"---"` for any.
    pub countries: Vec<String>,
    pub keywords: String,
    pub online: bool,
    pub photo: bool,
    /// Site-internal city code, resolved externally.
    pub city: Option<String>,
    pub city_name: Option<String>,
    pub sort: SortOrder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            age1: 16,
            age2: 110,
            sex: vec![Sex::Male, Sex::Female],
            continents: Continent::all(),
            countries: vec![ANY.to_string()],
            keywords: String::new(),
            online: false,
            photo: false,
            city: None,
            city_name: None,
            sort: SortOrder::LastLogin,
        }
    }
}

impl SearchOptions {
    /// Validates the caller-controlled parts of the filter.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.age2 < self.age1 {
            return Err(OptionsError::AgeRange {
                age1: self.age1,
                age2: self.age2,
            });
        }
        for country in &self.countries {
            let valid = country == ANY
                || (country.len() == 2 && country.chars().all(|c| c.is_ascii_uppercase()));
            if !valid {
                return Err(OptionsError::Country(country.clone()));
            }
        }
        Ok(())
    }

    /// Builds the full parameter set for one results page.
    ///
    /// The parameter order mirrors the search form submission; `csrf_token`
    /// is fetched once per search and fixed for the whole pagination run.
    pub(crate) fn to_params(&self, csrf_token: &str, offset: usize) -> Params {
        let mut params = Params::new();
        params.push("offset", offset.to_string());
        params.push("sort", self.sort.as_ref());
        params.push("age1", self.age1.to_string());
        params.push("age2", self.age2.to_string());
        params.push_all("sex[]", self.sex.iter().map(|s| s.as_ref().to_string()));
        params.push_all(
            "continents[]",
            self.continents.iter().map(|c| c.as_ref().to_string()),
        );
        params.push_all("countries[]", self.countries.iter().cloned());
        params.push("languages[]", ANY);
        params.push_all("lfor[]", LOOKING_FOR_FLAGS);
        params.push("keywords", self.keywords.clone());
        params.push("username", "");
        params.push("csrf_token", csrf_token);

        if self.online {
            params.push("online", "1");
        }
        if self.photo {
            params.push("photo", "1");
        }
        if let Some(city) = &self.city {
            params.push("city", city.clone());
        }
        if let Some(city_name) = &self.city_name {
            params.push("cityName", city_name.clone());
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults_match_the_form() {
        let options = SearchOptions::default();
        assert_eq!(options.age1, 16);
        assert_eq!(options.age2, 110);
        assert_eq!(options.sex, vec![Sex::Male, Sex::Female]);
        assert_eq!(options.continents.len(), 6);
        assert_eq!(options.countries, vec!["---"]);
        assert_eq!(options.sort, SortOrder::LastLogin);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn age_range_is_validated() {
        let options = SearchOptions {
            age1: 30,
            age2: 20,
            ..SearchOptions::default()
        };
        assert_eq!(
            options.validate(),
            Err(OptionsError::AgeRange { age1: 30, age2: 20 })
        );
    }

    #[test]
    fn country_codes_are_validated() {
        let options = SearchOptions {
            countries: vec!["France".to_string()],
            ..SearchOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(OptionsError::Country(c)) if c == "France"
        ));
    }

    #[test]
    fn params_carry_repeated_arrays_and_fixed_fields() {
        let options = SearchOptions::default();
        let params = options.to_params("tok123", 40);
        let encoded = params.encode();
        assert!(encoded.contains("offset=40"));
        assert!(encoded.contains("sort=last_login"));
        assert!(encoded.contains("sex%5B%5D=male&sex%5B%5D=female"));
        assert!(encoded.contains("continents%5B%5D=AF"));
        assert!(encoded.contains("lfor%5B%5D=lfor_email"));
        assert!(encoded.contains("csrf_token=tok123"));
        assert!(!encoded.contains("online=1"));
    }

    #[test]
    fn optional_flags_appear_only_when_set() {
        let options = SearchOptions {
            online: true,
            photo: true,
            city: Some("1234".to_string()),
            city_name: Some("Berlin".to_string()),
            ..SearchOptions::default()
        };
        let encoded = options.to_params("t", 0).encode();
        assert!(encoded.contains("online=1"));
        assert!(encoded.contains("photo=1"));
        assert!(encoded.contains("city=1234"));
        assert!(encoded.contains("cityName=Berlin"));
    }

    #[test]
    fn city_code_is_sent_without_a_name() {
        let options = SearchOptions {
            city: Some("703448".to_string()),
            ..SearchOptions::default()
        };
        let encoded = options.to_params("t", 0).encode();
        assert!(encoded.contains("city=703448"));
        assert!(!encoded.contains("cityName"));
    }

    #[test]
    fn filter_enums_parse_their_wire_values() {
        assert_eq!(Sex::from_str("male").unwrap(), Sex::Male);
        assert_eq!(Continent::from_str("EU").unwrap(), Continent::Eu);
        assert_eq!(SortOrder::from_str("last_login").unwrap(), SortOrder::LastLogin);
        assert!(Sex::from_str("robot").is_err());
    }
}
