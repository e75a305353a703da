//! # Vaccine Names
//!
//! Maps `(system, code)` codings to proprietary vaccine names for the card
//! summary. The built-in table covers the CVX codes of the COVID-19
//! vaccines; deployments can extend or override it from YAML:
//!
//! ```yaml
//! http://hl7.org/fhir/sid/cvx:
//!   "213": SARS-COV-2 (COVID-19) vaccine, unspecified formulation
//! ```

use std::collections::BTreeMap;

use crate::error::VcError;
use crate::fhir::Coding;

/// The CVX code system URI.
pub const CVX_SYSTEM: &str = "http://hl7.org/fhir/sid/cvx";

const DEFAULT_CVX_NAMES: &[(&str, &str)] = &[
    ("207", "Moderna COVID-19 Vaccine"),
    ("208", "Pfizer COVID-19 Vaccine"),
    ("210", "AstraZeneca COVID-19 Vaccine"),
    ("211", "Novavax COVID-19 Vaccine"),
    ("212", "Janssen COVID-19 Vaccine"),
];

/// Lookup table from code system and code to vaccine name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccineRegistry {
    names: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for VaccineRegistry {
    fn default() -> Self {
        let cvx = DEFAULT_CVX_NAMES
            .iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        Self {
            names: BTreeMap::from([(CVX_SYSTEM.to_string(), cvx)]),
        }
    }
}

impl VaccineRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Add or replace one name.
    pub fn insert(&mut self, system: &str, code: &str, name: &str) {
        self.names
            .entry(system.to_string())
            .or_default()
            .insert(code.to_string(), name.to_string());
    }

    /// Merge a YAML `system -> code -> name` mapping into the table.
    ///
    /// Entries in the document replace existing ones with the same key.
    pub fn merge_yaml(&mut self, yaml: &str) -> Result<(), VcError> {
        let overrides: BTreeMap<String, BTreeMap<String, String>> = serde_yaml::from_str(yaml)?;
        for (system, codes) in overrides {
            for (code, name) in codes {
                self.insert(&system, &code, &name);
            }
        }
        Ok(())
    }

    /// The name registered for `(system, code)`, if any.
    pub fn lookup(&self, system: &str, code: &str) -> Option<&str> {
        self.names.get(system)?.get(code).map(String::as_str)
    }

    /// A display name for a coding.
    ///
    /// Falls back to the coding's own `display`, then to `system#code`.
    pub fn human_readable(&self, coding: &Coding) -> String {
        let system = coding.system.as_deref().unwrap_or_default();
        let code = coding.code.as_deref().unwrap_or_default();
        if let Some(name) = self.lookup(system, code) {
            return name.to_string();
        }
        tracing::debug!(system, code, "vaccine code not in registry");
        match &coding.display {
            Some(display) => display.clone(),
            None => format!("{system}#{code}"),
        }
    }
}
