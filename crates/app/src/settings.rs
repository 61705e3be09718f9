//! Application settings.
//!
//! Read from an optional `settings.toml`, then `BELL24H__SECTION__KEY`
//! environment overrides, then the conventional `DATABASE_URL`, `PORT` and
//! `OPENAI_API_KEY` variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    /// Any sea-orm URL; `sqlite:` by default, `postgres://` works too.
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI when an API key is configured, canned replies otherwise.
    #[default]
    Auto,
    Canned,
    Openai,
}

#[derive(Debug, Deserialize)]
pub struct Assistant {
    #[serde(default)]
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Assistant {
    pub fn build(self) -> Result<server::Assistant, ConfigError> {
        let key = self.api_key.filter(|key| !key.trim().is_empty());
        match (self.provider, key) {
            (Provider::Canned, _) | (Provider::Auto, None) => Ok(server::Assistant::canned()),
            (Provider::Openai | Provider::Auto, Some(key)) => Ok(server::Assistant::openai(
                key,
                self.model,
                self.base_url,
            )),
            (Provider::Openai, None) => Err(ConfigError::Message(
                "assistant.provider = \"openai\" needs OPENAI_API_KEY".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub server: Server,
    pub assistant: Assistant,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("database.url", "sqlite:./bell24h.db?mode=rwc")?
            .set_default("server.port", 5000_i64)?
            .set_default("assistant.provider", "auto")?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("BELL24H")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("assistant.api_key", std::env::var("OPENAI_API_KEY").ok())?
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(provider: Provider, api_key: Option<&str>) -> Assistant {
        Assistant {
            provider,
            api_key: api_key.map(str::to_string),
            model: None,
            base_url: None,
        }
    }

    #[test]
    fn auto_provider_follows_api_key() {
        let canned = assistant(Provider::Auto, None).build().unwrap();
        assert_eq!(canned.provider_name(), "canned");

        let blank = assistant(Provider::Auto, Some("  ")).build().unwrap();
        assert_eq!(blank.provider_name(), "canned");

        let openai = assistant(Provider::Auto, Some("sk-test")).build().unwrap();
        assert_eq!(openai.provider_name(), "openai");
    }

    #[test]
    fn explicit_openai_requires_key() {
        assert!(assistant(Provider::Openai, None).build().is_err());

        let canned = assistant(Provider::Canned, Some("sk-test")).build().unwrap();
        assert_eq!(canned.provider_name(), "canned");
    }
}
