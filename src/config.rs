use std::env;
use std::time::Duration;

use color_eyre::eyre::{ensure, Result, WrapErr};

pub const TICKER_PLACEHOLDER: &str = "{ticker}";
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.google.com/finance/quote/{ticker}:BVMF?hl=en";
pub const DEFAULT_TICKERS: &[&str] = &["AAPL34", "AMZO34", "B3SA3", "BBDC4", "GOGL34", "IVVB11", "M1TA34"];

const URL_TEMPLATE_VAR: &str = "COTACAO_URL_TEMPLATE";
const TIMEOUT_VAR: &str = "COTACAO_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url_template: String,
    /// No timeout unless one is configured; a stuck request stalls only its ticker.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            timeout: None,
        }
    }
}

impl Config {
    /// Reads overrides from the process environment (including a loaded `.env`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(template) = lookup(URL_TEMPLATE_VAR) {
            ensure!(
                template.contains(TICKER_PLACEHOLDER),
                "{} must contain {}",
                URL_TEMPLATE_VAR,
                TICKER_PLACEHOLDER
            );
            config.url_template = template;
        }

        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let secs: u64 = secs
                .trim()
                .parse()
                .wrap_err_with(|| format!("{} is not a whole number of seconds", TIMEOUT_VAR))?;
            ensure!(secs > 0, "{} must be positive", TIMEOUT_VAR);
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
