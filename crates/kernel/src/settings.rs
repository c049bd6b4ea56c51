use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "development";
const ENV_VAR_NAME: &str = "ENV";
const ENV_DIR_VAR_NAME: &str = "ENV_DIR";

/// Keys read from the file and the process environment. Matching is case-sensitive.
const RECOGNISED_KEYS: &[&str] = &[
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASS",
    "DB_NAME",
    "LOG_LEVEL",
    "LOG_FORMAT",
];

/// Deployment mode selecting the `.env.<mode>` settings file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
    /// Any other mode name; its settings file is still `.env.<name>`.
    Other(String),
}

impl Environment {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "development" => Environment::Development,
            "test" => Environment::Test,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => Environment::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }

    /// File name of the settings file for this mode, e.g. `.env.production`.
    pub fn env_file_name(&self) -> String {
        format!(".env.{}", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller overrides applied on top of the environment-derived defaults.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Mode name; takes precedence over `ENV`.
    pub environment: Option<String>,
    /// Directory holding the `.env.<mode>` files; takes precedence over `ENV_DIR`.
    pub env_dir: Option<PathBuf>,
}

/// The settings file selected for the current mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvFile {
    pub path: PathBuf,
    pub found: bool,
    /// 1-based numbers of lines that could not be parsed and were ignored.
    pub skipped_lines: Vec<usize>,
}

/// Configuration resolved once at startup and passed explicitly afterwards.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub environment: Environment,
    pub env_file: EnvFile,
    pub database: DatabaseSettings,
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load settings from the process environment and the matching `.env.<mode>` file.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(LoadOptions::default())
    }

    pub fn load_with(options: LoadOptions) -> anyhow::Result<Self> {
        Self::from_sources(options, std::env::vars())
    }

    /// Resolve settings from an explicit snapshot of process variables.
    ///
    /// File values are layered first and the process variables on top, so a
    /// variable already set in the surrounding environment is never replaced
    /// by the file. Only the exact upper-case key names are consulted. The
    /// process environment itself is left untouched.
    pub fn from_sources<I>(options: LoadOptions, process_env: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let process: config::Map<String, String> = process_env.into_iter().collect();

        let mode = options
            .environment
            .or_else(|| process.get(ENV_VAR_NAME).cloned())
            .filter(|mode| !mode.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENV.to_string());
        let environment = Environment::parse(&mode);

        let env_dir = match options
            .env_dir
            .or_else(|| process.get(ENV_DIR_VAR_NAME).map(PathBuf::from))
        {
            Some(dir) => dir,
            None => std::env::current_dir().context("unable to resolve current directory")?,
        };
        let env_path = env_dir.join(environment.env_file_name());
        let parsed = read_env_file(&env_path)?;

        let env_file = EnvFile {
            path: env_path,
            found: parsed.is_some(),
            skipped_lines: parsed
                .as_ref()
                .map(|file| file.skipped_lines.clone())
                .unwrap_or_default(),
        };
        let file_values = parsed.map(|file| file.values).unwrap_or_default();

        let mut layered = config::Map::new();
        for &key in RECOGNISED_KEYS {
            if let Some(value) = process.get(key).or_else(|| file_values.get(key)) {
                layered.insert(key.to_string(), value.clone());
            }
        }

        let cfg = config::Config::builder()
            .add_source(config::Environment::default().source(Some(layered)))
            .build()
            .with_context(|| "failed to build configuration")?;

        let raw: RawSettings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        let port = match raw.db_port.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                value
                    .parse::<u16>()
                    .map_err(|err| anyhow!("invalid DB_PORT '{}': {}", value, err))?,
            ),
        };

        let log_format = match raw.log_format.as_deref() {
            None => LogFormat::default(),
            Some(value) => LogFormat::parse(value)?,
        };

        Ok(Settings {
            environment,
            env_file,
            database: DatabaseSettings {
                host: raw.db_host,
                port,
                user: raw.db_user,
                password: raw.db_pass,
                name: raw.db_name,
            },
            telemetry: TelemetrySettings {
                log_level: raw
                    .log_level
                    .unwrap_or_else(TelemetrySettings::default_log_level),
                log_format,
            },
        })
    }
}

#[derive(Debug, Default)]
struct ParsedEnvFile {
    values: config::Map<String, String>,
    skipped_lines: Vec<usize>,
}

/// Reads a dotenv-style file. A missing file yields `None`.
///
/// When the file does not parse as a whole, each line is parsed on its own
/// and lines that still fail are skipped.
fn read_env_file(path: &Path) -> anyhow::Result<Option<ParsedEnvFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to open {}", path.display()));
        }
    };

    let whole: Result<Vec<(String, String)>, dotenvy::Error> =
        dotenvy::from_read_iter(contents.as_bytes()).collect();
    if let Ok(pairs) = whole {
        return Ok(Some(ParsedEnvFile {
            values: pairs.into_iter().collect(),
            skipped_lines: Vec::new(),
        }));
    }

    let mut parsed = ParsedEnvFile::default();
    for (index, line) in contents.lines().enumerate() {
        for item in dotenvy::from_read_iter(line.as_bytes()) {
            match item {
                Ok((key, value)) => {
                    parsed.values.insert(key, value);
                }
                Err(_) => {
                    parsed.skipped_lines.push(index + 1);
                    break;
                }
            }
        }
    }

    Ok(Some(parsed))
}

/// Flat view of the recognised keys as they appear in the environment.
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default, alias = "DB_HOST")]
    db_host: Option<String>,
    #[serde(default, alias = "DB_PORT")]
    db_port: Option<String>,
    #[serde(default, alias = "DB_USER")]
    db_user: Option<String>,
    #[serde(default, alias = "DB_PASS")]
    db_pass: Option<String>,
    #[serde(default, alias = "DB_NAME")]
    db_name: Option<String>,
    #[serde(default, alias = "LOG_LEVEL")]
    log_level: Option<String>,
    #[serde(default, alias = "LOG_FORMAT")]
    log_format: Option<String>,
}

/// Connection parameters for the MySQL server.
///
/// Nothing here is required at load time; a missing value surfaces when the
/// bootstrapper tries to use it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!(
                "unsupported LOG_FORMAT '{}'; expected pretty/json",
                other
            )),
        }
    }
}
