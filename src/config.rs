use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use camino::Utf8PathBuf;
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::KiraError;
use crate::locale::NumberLocale;

pub const CONFIG_FILE: &str = "kira-sv.json";
pub const DEFAULT_RESOURCE_PATH: &str = "/data/study_metadata.json";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub resource_path: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub locale: Option<NumberLocale>,
}

/// Where the study document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Url(String),
    File(Utf8PathBuf),
}

impl SourceSpec {
    pub fn describe(&self) -> String {
        match self {
            SourceSpec::Url(url) => url.clone(),
            SourceSpec::File(path) => path.to_string(),
        }
    }
}

fn url_scheme() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").unwrap())
}

impl FromStr for SourceSpec {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(KiraError::InvalidSource(value.to_string()));
        }
        if url_scheme().is_match(trimmed) {
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(KiraError::InvalidSource(value.to_string()));
            }
            return Ok(SourceSpec::Url(trimmed.to_string()));
        }
        Ok(SourceSpec::File(Utf8PathBuf::from(trimmed)))
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub source: SourceSpec,
    pub locale: NumberLocale,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `--config`, then `./kira-sv.json`, then the user config dir.
    /// Missing implicit files fall back to defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let config: Config = match config_path {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
                tracing::debug!(path = %config_path.display(), "loaded viewer config");
                serde_json::from_str(&content)
                    .map_err(|err| KiraError::ConfigParse(err.to_string()))?
            }
            None => Config::default(),
        };

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let locale = config.locale.unwrap_or_default();

        let source: SourceSpec = match config.source {
            Some(source) => source.parse()?,
            None => {
                let base = config
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                let resource = config
                    .resource_path
                    .unwrap_or_else(|| DEFAULT_RESOURCE_PATH.to_string());
                join_url(&base, &resource).parse()?
            }
        };

        Ok(ResolvedConfig {
            schema_version,
            source,
            locale,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        let user = ProjectDirs::from("", "", "kira-study-viewer")?
            .config_dir()
            .join(CONFIG_FILE);
        user.exists().then_some(user)
    }
}

pub fn join_url(base: &str, resource: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        resource.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_point_at_fixed_resource() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.locale, NumberLocale::En);
        assert_eq!(
            resolved.source,
            SourceSpec::Url("http://localhost:8080/data/study_metadata.json".to_string())
        );
    }

    #[test]
    fn explicit_source_wins_over_base_url() {
        let config = Config {
            base_url: Some("https://example.org".to_string()),
            source: Some("fixtures/study.json".to_string()),
            ..Config::default()
        };
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(
            resolved.source,
            SourceSpec::File(Utf8PathBuf::from("fixtures/study.json"))
        );
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = "ftp://example.org/study.json".parse::<SourceSpec>().unwrap_err();
        assert_matches!(err, KiraError::InvalidSource(_));
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(
            join_url("https://host/", "/data/study_metadata.json"),
            "https://host/data/study_metadata.json"
        );
    }
}
