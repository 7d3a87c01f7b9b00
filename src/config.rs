// File: src/config.rs
use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "medrec.yaml";
pub const DEFAULT_DATABASE_PATH: &str = "medicines.json";
pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Configuration for the recommender and the curation tooling.
///
/// Every section is optional in the YAML file; missing sections fall back to
/// their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
    /// Where `curate` copies the store before rewriting it. Defaults to a
    /// `backups` directory next to the store.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub curation: CurationConfig,
}

/// TF-IDF fitting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Inclusive (min, max) phrase lengths, in tokens.
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Terms seen in fewer documents than this are dropped.
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    /// Terms seen in more than this fraction of documents are dropped.
    #[serde(default = "default_max_df")]
    pub max_df: f64,
}

/// Tables used by the curator when normalising the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Lower-cased use term -> canonical spelling.
    #[serde(default)]
    pub term_standardization: BTreeMap<String, String>,
    /// Substring of a use -> category. Checked in key order.
    #[serde(default = "default_category_mappings")]
    pub category_mappings: BTreeMap<String, String>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_min_df() -> usize {
    1
}

fn default_max_df() -> f64 {
    1.0
}

fn default_category_mappings() -> BTreeMap<String, String> {
    [
        ("allergy", "Antihistamine"),
        ("bacterial infection", "Antibiotic"),
        ("blood pressure", "Antihypertensive"),
        ("cough", "Antitussive"),
        ("depression", "Antidepressant"),
        ("diabetes", "Antidiabetic"),
        ("fever", "Analgesic/Antipyretic"),
        ("fungal infection", "Antifungal"),
        ("inflammation", "NSAID"),
        ("pain", "Analgesic"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_range: default_ngram_range(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            term_standardization: BTreeMap::new(),
            category_mappings: default_category_mappings(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_top_n: default_top_n(),
            backup_dir: None,
            vectorizer: VectorizerConfig::default(),
            curation: CurationConfig::default(),
        }
    }
}

impl Config {
    /// Directory that receives store backups.
    pub fn backup_dir(&self) -> PathBuf {
        match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => parent_or_current(&self.database_path).join(DEFAULT_BACKUP_DIR),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(RecommendError::ConfigRead)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `medrec.yaml` from the working directory, or the defaults when it
    /// does not exist.
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("default_top_n: 3\n").unwrap();
        assert_eq!(config.default_top_n, 3);
        assert_eq!(config.database_path, PathBuf::from("medicines.json"));
        assert_eq!(config.vectorizer, VectorizerConfig::default());
        assert!(config.curation.category_mappings.contains_key("pain"));
    }

    #[test]
    fn test_vectorizer_section() {
        let yaml = "vectorizer:\n  ngram_range: [1, 1]\n  max_df: 0.9\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.vectorizer.ngram_range, (1, 1));
        assert_eq!(config.vectorizer.min_df, 1);
        assert!((config.vectorizer.max_df - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_backup_dir_follows_store() {
        let config: Config = serde_yaml::from_str("database_path: data/meds.json\n").unwrap();
        assert_eq!(config.backup_dir(), PathBuf::from("data/backups"));
        assert_eq!(Config::default().backup_dir(), PathBuf::from("./backups"));

        let config: Config = serde_yaml::from_str("backup_dir: /var/medrec\n").unwrap();
        assert_eq!(config.backup_dir(), PathBuf::from("/var/medrec"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, RecommendError::ConfigRead(_)));
    }
}
