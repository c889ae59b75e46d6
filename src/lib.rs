//! NewsHub Environment Bootstrapper Library
//!
//! Prepares a NewsHub development checkout: copies `.env.local.example` to
//! `.env.local`, validates that the required variables are filled in and
//! reports where the project and its virtual environment live.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Local, git-ignored file holding the developer's actual values
pub const DEFAULT_ENV_FILE: &str = ".env.local";
/// Checked-in template listing the expected keys
pub const DEFAULT_ENV_EXAMPLE: &str = ".env.local.example";
pub const DEFAULT_VENV_DIR: &str = ".venv";
/// Optional configuration file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "newshub-env.toml";

/// Variables the application cannot start without
pub const REQUIRED_ENV_KEYS: [&str; 6] = [
    "DATABASE_URL",
    "NEXTAUTH_SECRET",
    "NEXTAUTH_URL",
    "JWT_ACCESS_SECRET",
    "JWT_REFRESH_SECRET",
    "NEWS_API_KEY",
];

/// Configuration for the bootstrapper
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Name of the target env file (default: ".env.local")
    pub env_file: Option<String>,
    /// Name of the example env file (default: ".env.local.example")
    pub env_example: Option<String>,
    /// Keys that must be present and non-empty in the target file
    pub required_keys: Option<Vec<String>>,
    /// Virtual environment directory reported by the summary (default: ".venv")
    pub venv_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_file: Some(DEFAULT_ENV_FILE.to_string()),
            env_example: Some(DEFAULT_ENV_EXAMPLE.to_string()),
            required_keys: Some(REQUIRED_ENV_KEYS.iter().map(|k| k.to_string()).collect()),
            venv_dir: Some(DEFAULT_VENV_DIR.to_string()),
        }
    }
}

/// Result of [`Bootstrapper::copy_example`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The example file was copied over the target
    Copied,
    /// The target already existed and `force` was not set
    Skipped,
    /// There is no example file to copy from
    MissingExample,
}

impl CopyOutcome {
    pub fn is_success(self) -> bool {
        !matches!(self, CopyOutcome::MissingExample)
    }
}

/// Result of [`Bootstrapper::check_env`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every required key has a value
    Complete,
    /// The target env file does not exist
    MissingEnvFile,
    /// These required keys are absent or empty, in required-list order
    MissingKeys(Vec<String>),
}

impl CheckOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Complete)
    }
}

/// Snapshot printed by the summary action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub root: PathBuf,
    pub env_file_name: String,
    pub env_file_exists: bool,
    pub venv_path: PathBuf,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NewsHub environment check")?;
        writeln!(f, " - Project root: {}", self.root.display())?;
        writeln!(
            f,
            " - {}: {}",
            self.env_file_name,
            if self.env_file_exists { "present" } else { "missing" }
        )?;
        write!(
            f,
            " - Virtualenv path: {} (in-project virtualenv recommended)",
            self.venv_path.display()
        )
    }
}

/// Resolves the bootstrap paths once and runs the individual actions
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    root: PathBuf,
    env_file: PathBuf,
    env_example: PathBuf,
    venv_dir: PathBuf,
    required_keys: Vec<String>,
}

impl Bootstrapper {
    /// Create a bootstrapper for `root` with the default configuration
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_config(root, Config::default())
    }

    /// Create a bootstrapper with custom configuration
    pub fn with_config<P: AsRef<Path>>(root: P, config: Config) -> Self {
        let root = root.as_ref().to_path_buf();
        let env_file = root.join(config.env_file.as_deref().unwrap_or(DEFAULT_ENV_FILE));
        let env_example = root.join(config.env_example.as_deref().unwrap_or(DEFAULT_ENV_EXAMPLE));
        let venv_dir = root.join(config.venv_dir.as_deref().unwrap_or(DEFAULT_VENV_DIR));
        let required_keys = config
            .required_keys
            .unwrap_or_else(|| REQUIRED_ENV_KEYS.iter().map(|k| k.to_string()).collect());

        debug!(
            root = %root.display(),
            env_file = %env_file.display(),
            env_example = %env_example.display(),
            "resolved bootstrap paths"
        );

        Self {
            root,
            env_file,
            env_example,
            venv_dir,
            required_keys,
        }
    }

    /// Load configuration from a TOML file
    pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<Config> {
        let config_path = config_path.as_ref();
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;
        debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    pub fn env_example(&self) -> &Path {
        &self.env_example
    }

    pub fn venv_dir(&self) -> &Path {
        &self.venv_dir
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    /// Copy the example file to the target file.
    ///
    /// An existing target is left alone unless `force` is set.
    pub fn copy_example(&self, force: bool) -> Result<CopyOutcome> {
        if !self.env_example.exists() {
            return Ok(CopyOutcome::MissingExample);
        }

        if self.env_file.exists() && !force {
            debug!(path = %self.env_file.display(), "target exists, skipping copy");
            return Ok(CopyOutcome::Skipped);
        }

        let bytes = fs::copy(&self.env_example, &self.env_file).with_context(|| {
            format!(
                "Failed to copy {:?} to {:?}",
                self.env_example, self.env_file
            )
        })?;
        debug!(bytes, path = %self.env_file.display(), "copied example env file");

        Ok(CopyOutcome::Copied)
    }

    /// Validate that the target file fills in every required key
    pub fn check_env(&self) -> Result<CheckOutcome> {
        if !self.env_file.exists() {
            return Ok(CheckOutcome::MissingEnvFile);
        }

        let values = parse_env_file(&self.env_file)?;
        let missing = missing_keys(&self.required_keys, &values);

        if missing.is_empty() {
            Ok(CheckOutcome::Complete)
        } else {
            Ok(CheckOutcome::MissingKeys(missing))
        }
    }

    pub fn summarize(&self) -> Summary {
        Summary {
            root: self.root.clone(),
            env_file_name: file_name(&self.env_file),
            env_file_exists: self.env_file.exists(),
            venv_path: self.venv_dir.clone(),
        }
    }

    /// Name of the target file as shown to the user
    pub fn env_file_name(&self) -> String {
        file_name(&self.env_file)
    }

    pub fn env_example_name(&self) -> String {
        file_name(&self.env_example)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Default project root: two levels above the running executable
pub fn default_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable path has no grandparent directory: {:?}", exe))
}

/// Read an env file into a key/value map. A missing file yields an empty map.
pub fn parse_env_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read env file: {:?}", path))?;
    let values = parse_env_str(&content);
    debug!(path = %path.display(), entries = values.len(), "parsed env file");
    Ok(values)
}

/// Parse `KEY=VALUE` lines. Later duplicates win.
pub fn parse_env_str(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            values.insert(
                key.trim().to_string(),
                strip_quotes(value.trim()).to_string(),
            );
        }
    }

    values
}

/// Remove one layer of matching single or double quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Keys from `keys`, in order, that are absent from `values` or empty
pub fn missing_keys<I, S>(keys: I, values: &HashMap<String, String>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .filter(|key| values.get(key.as_ref()).map_or(true, |value| value.is_empty()))
        .map(|key| key.as_ref().to_string())
        .collect()
}
