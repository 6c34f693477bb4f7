//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, in lookup order
const PROJECT_FILES: [&str; 2] = ["council.toml", ".council.toml"];
/// Prefix of configuration environment variables
const ENV_PREFIX: &str = "COUNCIL_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `COUNCIL_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./council.toml` or `./.council.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/llm-council/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Self::files(config_path, Self::project_config_path_in(Path::new(".")));
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment.extract().map_err(Box::new)
    }

    /// Merge defaults and config files, without the environment
    fn files(config_path: Option<&Path>, project: Option<PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/llm-council/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("llm-council").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_path_in(Path::new("."))
    }

    fn project_config_path_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for --show-config)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = config_path {
            let found = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", found, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./council.toml or ./.council.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.defaults.participants, vec!["openai", "anthropic"]);
        assert_eq!(config.engine.invocation_timeout_secs, 60);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("llm-council"));
    }

    #[test]
    fn test_project_file_lookup() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ConfigLoader::project_config_path_in(dir.path()), None);

        fs::write(dir.path().join(".council.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_path_in(dir.path()),
            Some(dir.path().join(".council.toml"))
        );

        fs::write(dir.path().join("council.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_path_in(dir.path()),
            Some(dir.path().join("council.toml"))
        );
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("council.toml");
        fs::write(
            &project,
            r#"
[engine]
invocation_timeout_secs = 10
request_deadline_secs = 100

[defaults]
strategy = "relay"
"#,
        )
        .unwrap();
        let explicit = dir.path().join("explicit.toml");
        fs::write(
            &explicit,
            r#"
[engine]
invocation_timeout_secs = 20
"#,
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::files(Some(&explicit), Some(project))
            .extract()
            .unwrap();

        assert_eq!(config.engine.invocation_timeout_secs, 20);
        assert_eq!(config.engine.request_deadline_secs, 100);
        assert_eq!(config.engine.session_ttl_secs, 900);
        assert_eq!(config.defaults.strategy, "relay");
    }

    #[test]
    fn test_environment_overrides_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("council.toml", "[engine]\nsweep_interval_secs = 5\n")?;
            jail.set_env("COUNCIL_ENGINE__SWEEP_INTERVAL_SECS", "7");
            jail.set_env("COUNCIL_OUTPUT__COLOR", "false");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.engine.sweep_interval_secs, 7);
            assert!(!config.output.color);
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[engine]\ninvocation_timeout_secs = \"soon\"\n").unwrap();

        let result: Result<FileConfig, _> = ConfigLoader::files(Some(&path), None).extract();
        assert!(result.is_err());
    }
}
