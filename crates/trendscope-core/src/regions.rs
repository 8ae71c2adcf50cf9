use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The collection plan read from `config/regions.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsFile {
    /// ISO 3166-1 alpha-2 region codes, processed in file order.
    pub regions: Vec<String>,
    /// Video category ids requested for every region.
    pub categories: Vec<String>,
}

/// Load and validate the regions configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
/// An empty region list is [`ConfigError::NoRegions`].
pub fn load_regions(path: &Path) -> Result<RegionsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let regions_file: RegionsFile = serde_yaml::from_str(&content)?;

    validate_regions(&regions_file)?;

    Ok(regions_file)
}

fn validate_regions(regions_file: &RegionsFile) -> Result<(), ConfigError> {
    if regions_file.regions.is_empty() {
        return Err(ConfigError::NoRegions);
    }

    let mut seen = HashSet::new();
    for region in &regions_file.regions {
        let well_formed = region.len() == 2 && region.bytes().all(|b| b.is_ascii_uppercase());
        if !well_formed {
            return Err(ConfigError::Validation(format!(
                "region '{region}' must be a two-letter uppercase code"
            )));
        }
        if !seen.insert(region.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region: '{region}'"
            )));
        }
    }

    if regions_file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category id is required".to_string(),
        ));
    }
    if let Some(bad) = regions_file
        .categories
        .iter()
        .find(|c| c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(ConfigError::Validation(format!(
            "category id '{bad}' must be numeric"
        )));
    }

    Ok(())
}
