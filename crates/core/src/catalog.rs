//! Product catalog: the static, read-only table of supported products.
//!
//! Each product lists its components (with the team that owns each one), a short
//! description used to ground feature-request prompts, and the general-inquiry
//! categories together with the resources suggested for each category.
//!
//! The catalog is loaded once at startup and shared behind an `Arc` afterwards; it is
//! never mutated, so concurrent readers need no locking.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Team name used when a component has no owning team registered.
pub const UNASSIGNED_TEAM: &str = "TBD";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read product catalog `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse product catalog `{path}` as JSON: {source}")]
    ParseJson { path: PathBuf, source: serde_json::Error },
    #[error("could not parse product catalog `{path}` as TOML: {source}")]
    ParseToml { path: PathBuf, source: toml::de::Error },
    #[error("product catalog validation failed: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    products: BTreeMap<String, ProductProfile>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProfile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub component_team_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub general_inquiry: InquiryResources,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryResources {
    #[serde(default)]
    pub resource_dict: BTreeMap<String, Vec<String>>,
}

/// A product looked up from the catalog, carrying its name alongside the profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductRef<'a> {
    pub name: &'a str,
    pub profile: &'a ProductProfile,
}

impl ProductCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;

        let is_toml = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let catalog = if is_toml {
            toml::from_str::<Self>(&raw)
                .map_err(|source| CatalogError::ParseToml { path: path.to_path_buf(), source })?
        } else {
            serde_json::from_str::<Self>(&raw)
                .map_err(|source| CatalogError::ParseJson { path: path.to_path_buf(), source })?
        };

        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog = serde_json::from_str::<Self>(raw).map_err(|source| {
            CatalogError::ParseJson { path: PathBuf::from("<inline>"), source }
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.is_empty() {
            return Err(CatalogError::Validation(
                "catalog must define at least one product under `products`".to_string(),
            ));
        }

        if let Some(blank) = self.products.keys().find(|name| name.trim().is_empty()) {
            return Err(CatalogError::Validation(format!(
                "product names must not be blank (found `{blank}`)"
            )));
        }

        for (name, profile) in &self.products {
            if profile.component_team_mapping.keys().any(|component| component.trim().is_empty())
            {
                return Err(CatalogError::Validation(format!(
                    "product `{name}` has a blank component name"
                )));
            }
        }

        Ok(())
    }

    pub fn get(&self, product: &str) -> Option<ProductRef<'_>> {
        self.products
            .get_key_value(product)
            .map(|(name, profile)| ProductRef { name: name.as_str(), profile })
    }

    pub fn contains(&self, product: &str) -> bool {
        self.products.contains_key(product)
    }

    pub fn products(&self) -> impl Iterator<Item = ProductRef<'_>> {
        self.products.iter().map(|(name, profile)| ProductRef { name: name.as_str(), profile })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductProfile {
    pub fn component_names(&self) -> Vec<&str> {
        self.component_team_mapping.keys().map(String::as_str).collect()
    }

    pub fn team_for(&self, component: &str) -> &str {
        self.component_team_mapping.get(component).map(String::as_str).unwrap_or(UNASSIGNED_TEAM)
    }

    /// One team per component, keeping order and duplicates of the input.
    pub fn assign_teams(&self, components: &[String]) -> Vec<String> {
        components.iter().map(|component| self.team_for(component).to_string()).collect()
    }

    pub fn inquiry_categories(&self) -> Vec<&str> {
        self.general_inquiry.resource_dict.keys().map(String::as_str).collect()
    }

    pub fn has_inquiry_category(&self, category: &str) -> bool {
        self.general_inquiry.resource_dict.contains_key(category)
    }

    pub fn resources_for(&self, category: &str) -> Vec<String> {
        self.general_inquiry.resource_dict.get(category).cloned().unwrap_or_default()
    }
}
