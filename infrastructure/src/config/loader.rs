//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["council.toml", ".council.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./council.toml` or `./.council.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/llm-council/config.toml`
    /// 4. Fallback: `~/.config/llm-council/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
    }

    /// Merge defaults with whichever of the given files exist
    pub fn load_from(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // A missing explicit file is an error rather than silently skipped
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/llm-council/config.toml if set,
    /// otherwise falls back to ~/.config/llm-council/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("llm-council").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for debugging)
    pub fn describe_sources() -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./council.toml or ./.council.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let marker = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", marker, path.display()));
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

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.agents.is_empty());
        assert_eq!(config.orchestration.global_timeout_ms, 13_000);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("llm-council"));
    }

    #[test]
    fn test_later_sources_override_earlier_ones() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("council.toml");
        fs::write(
            &global,
            "[orchestration]\nmax_retries = 5\nmax_in_flight = 4\n",
        )
        .unwrap();
        fs::write(&project, "[orchestration]\nmax_in_flight = 8\n").unwrap();

        let config = ConfigLoader::load_from(Some(&global), Some(&project), None).unwrap();

        assert_eq!(config.orchestration.max_retries, 5);
        assert_eq!(config.orchestration.max_in_flight, 8);
        assert_eq!(config.orchestration.global_timeout_ms, 13_000);
    }

    #[test]
    fn test_explicit_file_wins_and_keeps_agents() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("council.toml");
        let explicit = dir.path().join("custom.toml");
        fs::write(&project, "[output]\ncolor = false\n").unwrap();
        fs::write(
            &explicit,
            "[[agents]]\nprovider = \"scripted\"\nmodel = \"echo\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from(None, Some(&project), Some(&explicit)).unwrap();

        assert_eq!(config.agents.len(), 1);
        assert!(!config.output.color);
        assert_eq!(config.output.format, Some(council_domain::OutputFormat::Json));
    }

    #[test]
    fn test_missing_sources_are_skipped() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");

        let config = ConfigLoader::load_from(Some(&missing), Some(&missing), None).unwrap();

        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(ConfigLoader::load_from(None, None, Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("council.toml");
        fs::write(&path, "[orchestration]\nmax_retries = \"many\"\n").unwrap();

        assert!(ConfigLoader::load_from(None, Some(&path), None).is_err());
    }
}
