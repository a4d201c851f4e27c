use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Top-level product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dog,
    Cat,
    Other,
    /// Single-ingredient raw treats, sold by gram pack or piece count.
    Raw,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Dog => write!(f, "dog"),
            Section::Cat => write!(f, "cat"),
            Section::Other => write!(f, "other"),
            Section::Raw => write!(f, "raw"),
        }
    }
}

/// One sellable configuration from the pricing catalog.
///
/// Uniquely identified by `(section, name, weight_class)` after case and
/// whitespace folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub section: Section,
    pub name: String,
    /// `None` when physical size is not meaningful (e.g. a bag of complements).
    #[serde(default)]
    pub weight_class: Option<String>,
}

impl CanonicalProduct {
    #[must_use]
    pub fn new(section: Section, name: &str, weight_class: Option<&str>) -> Self {
        Self {
            section,
            name: name.to_string(),
            weight_class: weight_class.map(str::to_string),
        }
    }

    /// `"<name> <weight_class>"`, or just the name when there is no weight class.
    #[must_use]
    pub fn full_identifier(&self) -> String {
        match &self.weight_class {
            Some(weight) => format!("{} {}", self.name, weight),
            None => self.name.clone(),
        }
    }

    /// Case and whitespace only. Accent, punctuation and unit-spelling
    /// variants are caught by the engine's matcher-side duplicate check.
    fn identity_key(&self) -> (Section, String, Option<String>) {
        let fold = |s: &str| {
            s.split_whitespace()
                .map(str::to_uppercase)
                .collect::<Vec<_>>()
                .join(" ")
        };
        (
            self.section,
            fold(&self.name),
            self.weight_class.as_deref().map(|w| fold(w).replace(' ', "")),
        )
    }
}

impl std::fmt::Display for CanonicalProduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.section, self.full_identifier())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogFile {
    pub products: Vec<CanonicalProduct>,
}

/// Load and validate the canonical catalog from a YAML file.
///
/// Entry order is preserved; the matcher breaks ties by it.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
/// An empty catalog is a validation failure.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    if catalog.products.is_empty() {
        return Err(ConfigError::Validation(
            "catalog must contain at least one product".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for product in &catalog.products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "catalog entry in section '{}' has an empty name",
                product.section
            )));
        }

        if product
            .weight_class
            .as_deref()
            .is_some_and(|w| w.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "catalog entry '{}' has a blank weight class; omit it instead",
                product.name
            )));
        }

        if !seen.insert(product.identity_key()) {
            return Err(ConfigError::Validation(format!(
                "duplicate catalog entry: '{product}'"
            )));
        }
    }

    Ok(())
}
