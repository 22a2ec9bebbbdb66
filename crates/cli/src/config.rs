//! `cardbook.toml` loading and flag overrides.

use anyhow::{Context, Result};
use refresher::RefreshConfig;
use serde::Deserialize;
use sources::DirectoryCollector;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub refresh: RefreshSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshSection {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    /// Blank means every qualified contact is published
    #[serde(default)]
    pub match_category: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
            recursive: false,
        }
    }
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            match_category: String::new(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("cards")
}
fn default_extension() -> String {
    "vcf".to_string()
}
fn default_interval_hours() -> u64 {
    6
}

/// Command-line values that win over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub directory: Option<PathBuf>,
    pub extension: Option<String>,
    pub recursive: bool,
    pub interval_hours: Option<u64>,
    pub match_category: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(directory) = overrides.directory {
            self.source.directory = directory;
        }
        if let Some(extension) = overrides.extension {
            self.source.extension = extension;
        }
        // A flag can only switch recursion on
        self.source.recursive |= overrides.recursive;
        if let Some(hours) = overrides.interval_hours {
            self.refresh.interval_hours = hours;
        }
        if let Some(category) = overrides.match_category {
            self.refresh.match_category = category;
        }
        self
    }

    pub fn collector(&self) -> DirectoryCollector {
        DirectoryCollector::new(&self.source.directory)
            .with_extension(&self.source.extension)
            .with_recursive(self.source.recursive)
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig::from_hours(self.refresh.interval_hours, &self.refresh.match_category)
    }
}
