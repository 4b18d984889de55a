use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sheets: SheetsConfig,
    pub model: ModelConfig,
    pub webhook: WebhookConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub access_token: SecretString,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub sales_sheet: String,
    pub matrix_sheet: String,
    pub projection_sheet: String,
    pub summary_sheet: String,
    pub domestic_country: String,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub spreadsheet_id: Option<String>,
    pub access_token: Option<String>,
    pub domestic_country: Option<String>,
    pub webhook_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheets: SheetsConfig {
                spreadsheet_id: String::new(),
                access_token: String::new().into(),
                base_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
                timeout_secs: 30,
            },
            model: ModelConfig {
                sales_sheet: "Sheet1".to_string(),
                matrix_sheet: "Matrix".to_string(),
                projection_sheet: "Capacity Rep Projection".to_string(),
                summary_sheet: "Capacity Summary".to_string(),
                domestic_country: "United States".to_string(),
            },
            webhook: WebhookConfig { url: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = options.config_path {
            // An explicitly named file must exist; only the default search
            // is allowed to come up empty.
            if !path.exists() {
                return Err(ConfigError::MissingConfigFile(path));
            }
            config.apply_patch(read_patch(&path)?);
        } else if let Some(path) = default_config_path() {
            config.apply_patch(read_patch(&path)?);
        } else if options.require_file {
            return Err(ConfigError::MissingConfigFile(PathBuf::from("capmodel.toml")));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(sheets) = patch.sheets {
            if let Some(spreadsheet_id) = sheets.spreadsheet_id {
                self.sheets.spreadsheet_id = spreadsheet_id;
            }
            if let Some(access_token_value) = sheets.access_token {
                self.sheets.access_token = access_token_value.into();
            }
            if let Some(base_url) = sheets.base_url {
                self.sheets.base_url = base_url;
            }
            if let Some(timeout_secs) = sheets.timeout_secs {
                self.sheets.timeout_secs = timeout_secs;
            }
        }

        if let Some(model) = patch.model {
            if let Some(sales_sheet) = model.sales_sheet {
                self.model.sales_sheet = sales_sheet;
            }
            if let Some(matrix_sheet) = model.matrix_sheet {
                self.model.matrix_sheet = matrix_sheet;
            }
            if let Some(projection_sheet) = model.projection_sheet {
                self.model.projection_sheet = projection_sheet;
            }
            if let Some(summary_sheet) = model.summary_sheet {
                self.model.summary_sheet = summary_sheet;
            }
            if let Some(domestic_country) = model.domestic_country {
                self.model.domestic_country = domestic_country;
            }
        }

        if let Some(webhook) = patch.webhook {
            if let Some(url) = webhook.url {
                self.webhook.url = Some(url);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CAPMODEL_SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = value;
        }
        if let Some(value) = read_env("CAPMODEL_SHEETS_ACCESS_TOKEN") {
            self.sheets.access_token = value.into();
        }
        if let Some(value) = read_env("CAPMODEL_SHEETS_BASE_URL") {
            self.sheets.base_url = value;
        }
        if let Some(value) = read_env("CAPMODEL_SHEETS_TIMEOUT_SECS") {
            self.sheets.timeout_secs = parse_u64("CAPMODEL_SHEETS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CAPMODEL_SALES_SHEET") {
            self.model.sales_sheet = value;
        }
        if let Some(value) = read_env("CAPMODEL_MATRIX_SHEET") {
            self.model.matrix_sheet = value;
        }
        if let Some(value) = read_env("CAPMODEL_PROJECTION_SHEET") {
            self.model.projection_sheet = value;
        }
        if let Some(value) = read_env("CAPMODEL_SUMMARY_SHEET") {
            self.model.summary_sheet = value;
        }
        if let Some(value) = read_env("CAPMODEL_DOMESTIC_COUNTRY") {
            self.model.domestic_country = value;
        }

        if let Some(value) = read_env("CAPMODEL_WEBHOOK_URL") {
            self.webhook.url = Some(value);
        }

        if let Some(value) = read_env("CAPMODEL_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("CAPMODEL_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(spreadsheet_id) = overrides.spreadsheet_id {
            self.sheets.spreadsheet_id = spreadsheet_id;
        }
        if let Some(access_token) = overrides.access_token {
            self.sheets.access_token = access_token.into();
        }
        if let Some(domestic_country) = overrides.domestic_country {
            self.model.domestic_country = domestic_country;
        }
        if let Some(webhook_url) = overrides.webhook_url {
            self.webhook.url = Some(webhook_url);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sheets(&self.sheets)?;
        validate_model(&self.model)?;
        validate_webhook(&self.webhook)?;
        validate_logging(&self.logging)?;
        Ok(())
    }

    /// Checks a command that talks to the spreadsheet platform can run:
    /// validation plus non-empty spreadsheet id and access token.
    pub fn validate_for_sheets_access(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sheets.spreadsheet_id is required (set CAPMODEL_SPREADSHEET_ID or capmodel.toml)"
                    .to_string(),
            ));
        }
        if self.sheets.access_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "sheets.access_token is required (set CAPMODEL_SHEETS_ACCESS_TOKEN)".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    [PathBuf::from("capmodel.toml"), PathBuf::from("config/capmodel.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_sheets(sheets: &SheetsConfig) -> Result<(), ConfigError> {
    if !sheets.base_url.starts_with("http://") && !sheets.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "sheets.base_url must start with http:// or https://".to_string(),
        ));
    }

    if sheets.timeout_secs == 0 || sheets.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "sheets.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_model(model: &ModelConfig) -> Result<(), ConfigError> {
    for (field, value) in [
        ("model.sales_sheet", &model.sales_sheet),
        ("model.matrix_sheet", &model.matrix_sheet),
        ("model.projection_sheet", &model.projection_sheet),
        ("model.summary_sheet", &model.summary_sheet),
        ("model.domestic_country", &model.domestic_country),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{field} must not be empty")));
        }
    }

    Ok(())
}

fn validate_webhook(webhook: &WebhookConfig) -> Result<(), ConfigError> {
    if let Some(url) = &webhook.url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "webhook.url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    sheets: Option<SheetsPatch>,
    model: Option<ModelPatch>,
    webhook: Option<WebhookPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetsPatch {
    spreadsheet_id: Option<String>,
    access_token: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelPatch {
    sales_sheet: Option<String>,
    matrix_sheet: Option<String>,
    projection_sheet: Option<String>,
    summary_sheet: Option<String>,
    domestic_country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPatch {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_use_original_sheet_names() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.model.sales_sheet == "Sheet1", "default sales sheet")?;
        ensure(config.model.matrix_sheet == "Matrix", "default matrix sheet")?;
        ensure(
            config.model.projection_sheet == "Capacity Rep Projection",
            "default projection sheet",
        )?;
        ensure(config.model.summary_sheet == "Capacity Summary", "default summary sheet")?;
        ensure(config.model.domestic_country == "United States", "default domestic country")?;
        Ok(())
    }

    #[test]
    fn missing_explicit_config_path_is_refused() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("capmodel.toml");

        match AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            ..LoadOptions::default()
        }) {
            Ok(_) => Err("a nonexistent explicit config path should not load".to_string()),
            Err(ConfigError::MissingConfigFile(reported)) => {
                ensure(reported == path, "error should carry the requested path")
            }
            Err(other) => Err(format!("unexpected error variant: {other}")),
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SHEETS_TOKEN", "ya29-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("capmodel.toml");
            fs::write(
                &path,
                r#"
[sheets]
spreadsheet_id = "sheet-from-file"
access_token = "${TEST_SHEETS_TOKEN}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.sheets.spreadsheet_id == "sheet-from-file",
                "spreadsheet id should come from the file",
            )?;
            ensure(
                config.sheets.access_token.expose_secret() == "ya29-from-env",
                "access token should be interpolated from the environment",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_SHEETS_TOKEN"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CAPMODEL_SPREADSHEET_ID", "sheet-from-env");
        env::set_var("CAPMODEL_DOMESTIC_COUNTRY", "Canada");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("capmodel.toml");
            fs::write(
                &path,
                r#"
[sheets]
spreadsheet_id = "sheet-from-file"

[model]
domestic_country = "Mexico"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.sheets.spreadsheet_id == "sheet-from-env",
                "env spreadsheet id should win over the file",
            )?;
            ensure(
                config.model.domestic_country == "Canada",
                "env domestic country should win over the file",
            )?;
            ensure(config.logging.level == "debug", "programmatic log level should win")?;
            Ok(())
        })();

        clear_vars(&["CAPMODEL_SPREADSHEET_ID", "CAPMODEL_DOMESTIC_COUNTRY"]);
        result
    }

    #[test]
    fn log_format_env_override_is_parsed() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CAPMODEL_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json log format should be set from env var",
            )
        })();

        clear_vars(&["CAPMODEL_LOG_FORMAT"]);
        result
    }

    #[test]
    fn validation_rejects_bad_values() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CAPMODEL_SHEETS_TIMEOUT_SECS", "0");

        let result = (|| -> Result<(), String> {
            match AppConfig::load(LoadOptions::default()) {
                Ok(_) => Err("expected validation failure but config load succeeded".to_string()),
                Err(ConfigError::Validation(message)) => {
                    ensure(message.contains("timeout_secs"), "error should name the field")
                }
                Err(other) => Err(format!("unexpected error variant: {other}")),
            }
        })();

        clear_vars(&["CAPMODEL_SHEETS_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn sheets_access_requires_id_and_token() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(
            config.validate_for_sheets_access().is_err(),
            "empty spreadsheet id and token should not pass the sheets-access check",
        )
    }
}
