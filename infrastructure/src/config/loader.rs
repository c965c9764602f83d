//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "agentry.toml";

/// Prefix for environment overrides, e.g. `AGENTRY_REACT__MAX_DOMAIN_TURNS=3`.
pub const ENV_PREFIX: &str = "AGENTRY_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `AGENTRY_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./agentry.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/agentry/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Path::new(PROJECT_CONFIG_FILE),
            config_path.map(PathBuf::as_path),
        )
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global) = global
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }

        if project.exists() {
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agentry").join("config.toml"))
    }

    /// Default directory for session snapshots.
    pub fn default_store_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("agentry").join("sessions"))
    }

    /// Describe where configuration is read from (for `-v` diagnostics).
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mut sources = Vec::new();
        if let Some(path) = Self::global_config_path() {
            let found = if path.exists() { "FOUND" } else { "     " };
            sources.push(format!("[{}] Global:   {}", found, path.display()));
        }
        let found = if Path::new(PROJECT_CONFIG_FILE).exists() { "FOUND" } else { "     " };
        sources.push(format!("[{}] Project:  ./{}", found, PROJECT_CONFIG_FILE));
        if let Some(path) = config_path {
            let found = if path.exists() { "FOUND" } else { "MISSING" };
            sources.push(format!("[{}] Explicit: {}", found, path.display()));
        }
        sources.push(format!("[     ] Env:      {}*", ENV_PREFIX));
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.react.max_domain_turns, 6);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            dir.path(),
            "global.toml",
            "[react]\nmax_domain_turns = 2\nmax_tool_result_chars = 100\n",
        );
        let project = write(dir.path(), "project.toml", "[react]\nmax_domain_turns = 4\n");
        let explicit = write(dir.path(), "explicit.toml", "[llm]\nmodel = \"local\"\n");

        let config: FileConfig = ConfigLoader::figment(Some(&global), &project, Some(&explicit))
            .extract()
            .unwrap();

        assert_eq!(config.react.max_domain_turns, 4);
        assert_eq!(config.react.max_tool_result_chars, 100);
        assert_eq!(config.react.tool_timeout_seconds, 30);
        assert_eq!(config.llm.model, "local");
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config: FileConfig = ConfigLoader::figment(
            Some(&dir.path().join("nope.toml")),
            &dir.path().join("also-nope.toml"),
            None,
        )
        .extract()
        .unwrap();
        assert_eq!(config.react, FileConfig::default().react);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("agentry"));
    }
}
