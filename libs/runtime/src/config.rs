use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::paths::resolve_home_dir;

/// Home directory name under the user's home when `server.home_dir` is empty.
pub const DEFAULT_HOME_SUBDIR: &str = ".roomcheck";

/// Application configuration: typed global sections plus a per-module bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Logging sections; built-in defaults when absent.
    pub logging: Option<LoggingConfig>,
    /// Directory of `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// module name → raw module section
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Normalized to an absolute path on load
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Front-end bundle served over HTTP
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Grace period for in-flight requests on shutdown; 0 waits forever
    #[serde(default)]
    pub timeout_sec: u64,
}

/// Logging sections keyed by crate name. `default` covers every target not
/// claimed by another key.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Section {
    /// "trace" | "debug" | "info" | "warn" | "error" | "off"
    pub console_level: String,
    /// Log file, relative to `server.home_dir`; empty disables file output
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    /// Rotated files kept next to the live one
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty resolves to <user home>/.roomcheck
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: default_static_dir(),
            timeout_sec: 0,
        }
    }
}

fn default_static_dir() -> String {
    "public".to_string()
}

pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/roomcheck.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Layered load: defaults → YAML file → `APP__` environment variables.
    /// `server.home_dir` is normalized and created.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }

        // Optional sections stay None unless YAML or ENV provide them.
        let base = AppConfig {
            server: ServerConfig::default(),
            logging: None,
            modules_dir: None,
            modules: HashMap::new(),
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // APP__SERVER__PORT=9000 → server.port
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("invalid config {}", path.display()))?;

        normalize_home_dir_inplace(&mut config.server)
            .context("Failed to resolve server.home_dir")?;

        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, dir)?;
        }

        Ok(config)
    }

    /// Load from `config_path`, or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)
                    .context("Failed to resolve server.home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }

    /// Typed section of one module; defaults when the module has no entry.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("invalid config for module '{name}'")),
            None => Ok(T::default()),
        }
    }

    /// `server.static_dir` resolved against the home directory.
    pub fn static_root(&self) -> PathBuf {
        let dir = Path::new(&self.server.static_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            Path::new(&self.server.home_dir).join(dir)
        }
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}

fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let configured = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved = resolve_home_dir(configured, DEFAULT_HOME_SUBDIR, true)
        .context("home_dir normalization failed")?;

    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}

fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_yaml = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_yaml {
            continue;
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let val: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        bag.insert(name.to_string(), serde_json::to_value(val)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn is_normalized_path(p: &str) -> bool {
        PathBuf::from(p).is_absolute() && !p.starts_with('~')
    }

    fn write_config(dir: &Path, yaml: &str) -> PathBuf {
        let path = dir.join("config.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        #[serde(default)]
        history_limit: usize,
    }

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.home_dir, "");
        assert_eq!(config.server.static_dir, "public");

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "info");
        assert_eq!(logging["default"].file, "logs/roomcheck.log");
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_load_layered_normalizes_home_dir() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home");
        let cfg_path = write_config(
            tmp.path(),
            &format!(
                r#"
server:
  home_dir: "{}"
  host: "0.0.0.0"
  port: 9090
  static_dir: "/srv/roomcheck"

logging:
  default:
    console_level: debug
    file: "logs/default.log"
"#,
                home.to_string_lossy().replace('\\', "/")
            ),
        );

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert!(is_normalized_path(&config.server.home_dir));
        assert!(home.is_dir());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.static_root(), PathBuf::from("/srv/roomcheck"));

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "debug");
        assert_eq!(logging["default"].file, "logs/default.log");
    }

    #[test]
    fn test_load_or_default_resolves_platform_home() {
        let config = AppConfig::load_or_default(None::<&str>).unwrap();
        assert!(is_normalized_path(&config.server.home_dir));
        assert!(config.server.home_dir.ends_with(DEFAULT_HOME_SUBDIR));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_minimal_yaml_leaves_optional_sections_empty() {
        let tmp = tempdir().unwrap();
        let cfg_path = write_config(
            tmp.path(),
            &format!(
                "server:\n  home_dir: \"{}\"\n  host: localhost\n  port: 8080\n",
                tmp.path().join("h").to_string_lossy().replace('\\', "/")
            ),
        );

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir, "public");
        assert!(config.logging.is_none());
        assert!(config.modules.is_empty());
        assert!(config
            .static_root()
            .starts_with(Path::new(&config.server.home_dir)));
    }

    #[test]
    fn test_cli_verbose_levels() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (3, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                port: Some(3000),
                verbose,
                ..Default::default()
            });

            assert_eq!(config.server.port, 3000);
            let logging = config.logging.as_ref().unwrap();
            assert_eq!(logging["default"].console_level, expected);
        }
    }

    #[test]
    fn test_modules_dir_is_merged() {
        let tmp = tempdir().unwrap();
        let modules_dir = tmp.path().join("modules");
        fs::create_dir_all(&modules_dir).unwrap();
        fs::write(modules_dir.join("housekeeping.yaml"), "history_limit: 5\n").unwrap();
        fs::write(modules_dir.join("notes.txt"), "ignored").unwrap();

        let cfg_path = write_config(
            tmp.path(),
            &format!(
                r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 8000

modules_dir: "{modules}"

modules:
  other:
    key: "value"
"#,
                home = tmp.path().join("h").to_string_lossy().replace('\\', "/"),
                modules = modules_dir.to_string_lossy().replace('\\', "/"),
            ),
        );

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert!(config.modules.contains_key("other"));
        assert!(!config.modules.contains_key("notes"));
        let probe: Probe = config.module_config("housekeeping").unwrap();
        assert_eq!(probe, Probe { history_limit: 5 });
    }

    #[test]
    fn test_module_config_defaults_and_rejects_unknown_keys() {
        let mut config = AppConfig::default();
        let probe: Probe = config.module_config("housekeeping").unwrap();
        assert_eq!(probe, Probe::default());

        config
            .modules
            .insert("housekeeping".into(), serde_json::json!({ "bogus": 1 }));
        assert!(config.module_config::<Probe>("housekeeping").is_err());
    }

    #[test]
    fn test_to_yaml_roundtrip_basic() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("server:"));
        assert!(yaml.contains("static_dir:"));

        let roundtrip: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(roundtrip.server.port, config.server.port);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let invalid_yaml = r#"
server:
  home_dir: "~/.test"
  port: 8000
"#;
        let result: Result<AppConfig, _> = serde_yaml::from_str(invalid_yaml);
        assert!(result.is_err());
    }
}
