//! Configuration file loader with multi-source merging

use super::file_config::{ConfigValidationError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "consult-quorum";
const PROJECT_FILES: [&str; 2] = ["consult.toml", ".consult.toml"];
const ENV_PREFIX: &str = "CONSULT_";

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {}", format_issues(.0))]
    Invalid(Vec<ConfigValidationError>),
}

fn format_issues(issues: &[ConfigValidationError]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The files and environment a configuration is merged from
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
    /// Read `CONSULT_*` environment variables
    pub env: bool,
}

impl ConfigSources {
    /// Discover the standard locations, plus an explicit file if given
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            global: ConfigLoader::global_config_path().filter(|p| p.exists()),
            project: ConfigLoader::project_config_path(),
            explicit: explicit.map(Path::to_path_buf),
            env: true,
        }
    }
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `CONSULT_*`, `__` separates sections
    ///    (`CONSULT_ORCHESTRATOR__DEADLINE_MS=60000`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./consult.toml` or `./.consult.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/consult-quorum/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::load_from(&ConfigSources::discover(config_path))
    }

    /// Merge the given sources over the defaults
    pub fn load_from(sources: &ConfigSources) -> Result<FileConfig, ConfigError> {
        if let Some(path) = &sources.explicit
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.clone()));
        }

        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in [&sources.global, &sources.project, &sources.explicit]
            .into_iter()
            .flatten()
        {
            figment = figment.merge(Toml::file(path));
        }
        if sources.env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        figment.extract().map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Load and reject configurations with validation issues
    pub fn load_validated(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let config = Self::load(config_path)?;
        Self::ensure_valid(config)
    }

    pub fn ensure_valid(config: FileConfig) -> Result<FileConfig, ConfigError> {
        let issues = config.validate();
        if issues.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {}*", ENV_PREFIX));
        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{mark}] Explicit: {}", path.display()));
        }
        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!(
                "  [     ] Project: ./{} or ./{}",
                PROJECT_FILES[0], PROJECT_FILES[1]
            )),
        }
        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{mark}] Global:  {}", path.display()));
        }
        lines.push("  [     ] Default: built-in defaults".to_string());

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.panel.agents.is_empty());
        assert_eq!(config.orchestrator.quorum_rule, "majority");
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains(APP_DIR));
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let dir = TempDir::new().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[orchestrator]\ndeadline_ms = 1000\nquorum_rule = \"unanimous\"\n",
        );
        let explicit = write(&dir, "explicit.toml", "[orchestrator]\ndeadline_ms = 2000\n");

        let config = ConfigLoader::load_from(&ConfigSources {
            global: Some(global),
            explicit: Some(explicit),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.orchestrator.deadline_ms, 2000);
        assert_eq!(config.orchestrator.quorum_rule, "unanimous");
        assert_eq!(config.panel.max_rounds, 3);
    }

    #[test]
    fn test_agents_load_from_file() {
        let dir = TempDir::new().unwrap();
        let project = write(
            &dir,
            "consult.toml",
            r#"
[[panel.agents]]
id = "cardiology"
role = "Cardiologist"

[[panel.agents]]
id = "pharmacy"
"#,
        );

        let config = ConfigLoader::load_from(&ConfigSources {
            project: Some(project),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.panel.agents.len(), 2);
        assert!(ConfigLoader::ensure_valid(config).is_ok());
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::load_from(&ConfigSources {
            explicit: Some(PathBuf::from("/nonexistent/consult.toml")),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_invalid_value_type() {
        let dir = TempDir::new().unwrap();
        let explicit = write(&dir, "bad.toml", "[panel]\nmax_rounds = \"three\"\n");
        let result = ConfigLoader::load_from(&ConfigSources {
            explicit: Some(explicit),
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::Extract(_))));
    }

    #[test]
    fn test_ensure_valid_lists_issues() {
        let err = ConfigLoader::ensure_valid(FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("at least one agent"));
    }
}
