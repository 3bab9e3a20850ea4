pub use model::*;

mod model;

use std::convert::{TryFrom, TryInto};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::SettingsError;
use crate::flow::Variant;

pub const CONFIGURATION_DIR: &str = "configuration";
pub const ENV_PREFIX: &str = "app";

/// Loads settings from the configuration directory under the current working directory, then
/// applies command line overrides.
#[tracing::instrument(level = "info", skip(options))]
pub fn get_settings(options: &CliOptions) -> Result<Settings, SettingsError> {
    let base_path = std::env::current_dir().map_err(|err| config::ConfigError::Foreign(Box::new(err)))?;
    let configuration_directory = base_path.join(CONFIGURATION_DIR);

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()?;

    let settings = load_settings(&configuration_directory, environment, options.config.as_deref())?;
    Ok(options.apply(settings))
}

/// Layers, lowest precedence first: `<dir>/base`, `<dir>/<environment>`, the explicit file (which
/// must exist when given), then `APP_`-prefixed environment variables using `__` as the nesting
/// separator; e.g., `APP_GENERATION__COUNT=15` sets `Settings.generation.count`.
pub fn load_settings(
    configuration_directory: &Path, environment: Environment, explicit: Option<&Path>,
) -> Result<Settings, SettingsError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base")).required(false))
        .add_source(config::File::from(configuration_directory.join(environment.as_ref())).required(false));

    if let Some(path) = explicit {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Settings>()?;

    tracing::debug!(?settings, %environment, "settings loaded");
    Ok(settings)
}

#[derive(Debug, Default, Clone, Parser)]
#[command(version, about = "Print odd random numbers produced through several async stream styles.")]
pub struct CliOptions {
    /// explicit configuration file to load on top of the environment-based configuration.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// number of samples to attempt per run.
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub count: Option<i64>,

    /// seed for reproducible runs; every variant replays the same samples.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// use the slower [300ms, 1500ms) delay between samples.
    #[arg(long)]
    pub slow: bool,

    /// cancel each run after this many milliseconds.
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// variants to run, in order. May be repeated.
    #[arg(short, long = "variant", value_enum)]
    pub variants: Vec<Variant>,
}

impl CliOptions {
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(count) = self.count {
            settings.generation.count = count;
        }

        if self.seed.is_some() {
            settings.generation.seed = self.seed;
        }

        if self.slow {
            settings.generation.min_delay_ms = SLOW_MIN_DELAY_MS;
            settings.generation.max_delay_ms = SLOW_MAX_DELAY_MS;
        }

        if self.timeout_ms.is_some() {
            settings.timeout_ms = self.timeout_ms;
        }

        if !self.variants.is_empty() {
            settings.variants = self.variants.clone();
        }

        settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl AsRef<str> for Environment {
    fn as_ref(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl TryFrom<String> for Environment {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(SettingsError::Environment(format!(
                "do not recognize {} environment.",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use claim::*;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_without_configuration() {
        let dir = assert_ok!(tempfile::tempdir());
        let settings = assert_ok!(load_settings(dir.path(), Environment::Local, None));
        assert_eq!(settings.generation, GenerationSettings::default());
        assert_eq!(settings.variants, Variant::all());
        assert_eq!(settings.timeout_ms, None);
    }

    #[test]
    fn test_layered_configuration() {
        let dir = assert_ok!(tempfile::tempdir());
        let mut base = assert_ok!(std::fs::File::create(dir.path().join("base.yaml")));
        assert_ok!(writeln!(
            base,
            "generation:\n  count: 15\n  min_delay_ms: 300\n  max_delay_ms: 1500\nvariants:\n  - pull\n  - graph"
        ));
        let mut production = assert_ok!(std::fs::File::create(dir.path().join("production.yaml")));
        assert_ok!(writeln!(production, "generation:\n  seed: 42\ntimeout_ms: 2000"));

        let settings = assert_ok!(load_settings(dir.path(), Environment::Production, None));
        assert_eq!(
            settings.generation,
            GenerationSettings { count: 15, min_delay_ms: 300, max_delay_ms: 1500, seed: Some(42) }
        );
        assert_eq!(settings.variants, vec![Variant::Pull, Variant::Graph]);
        assert_eq!(settings.timeout_ms, Some(2000));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = assert_ok!(tempfile::tempdir());
        let missing = dir.path().join("missing.yaml");
        assert_err!(load_settings(dir.path(), Environment::Local, Some(&missing)));
    }

    #[test]
    fn test_cli_overrides() {
        let options = CliOptions::parse_from(["numflow", "-n", "-3", "--seed", "9", "--slow", "-v", "push", "-v", "pull"]);
        let settings = options.apply(Settings::default());
        assert_eq!(settings.generation.count, -3);
        assert_eq!(settings.generation.seed, Some(9));
        assert_eq!(settings.generation.min_delay_ms, SLOW_MIN_DELAY_MS);
        assert_eq!(settings.variants, vec![Variant::Push, Variant::Pull]);
        assert_err!(settings.generation_request());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(assert_ok!(Environment::try_from("PRODUCTION".to_string())), Environment::Production);
        assert_err!(Environment::try_from("staging".to_string()));
    }
}
