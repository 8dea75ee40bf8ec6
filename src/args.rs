use clap::Parser;

use crate::config::DEFAULT_TICKERS;

/// Prints a colored quote table for B3 tickers.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Ticker symbols, case-insensitive. Defaults to a built-in list.
    pub tickers: Vec<String>,
}

impl Args {
    /// Uppercased tickers in the order given, or the default list.
    pub fn tickers(&self) -> Vec<String> {
        let given: Vec<String> = self
            .tickers
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
            .collect();

        if given.is_empty() {
            DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect()
        } else {
            given
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_given_tickers() {
        let args = Args::parse_from(["cotacao", "petr4", "Vale3"]);
        assert_eq!(args.tickers(), vec!["PETR4", "VALE3"]);
    }

    #[test]
    fn falls_back_to_defaults() {
        let args = Args::parse_from(["cotacao"]);
        assert_eq!(args.tickers(), DEFAULT_TICKERS);
    }
}
