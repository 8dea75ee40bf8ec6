use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, TICKER_PLACEHOLDER};
use crate::extract::{Field, FieldExtractor};

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to parse {0}")]
    MissingField(Field),
}

/// One ticker's scraped numbers plus the derived daily change.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub year_low: f64,
    pub year_high: f64,
    /// Fraction, not percent: 0.05 means up 5%.
    pub percent_change: f64,
}

impl Quote {
    pub fn new(symbol: &str, price: f64, previous_close: f64, year_low: f64, year_high: f64) -> Self {
        Quote {
            symbol: symbol.to_string(),
            price,
            previous_close,
            year_low,
            year_high,
            percent_change: (price - previous_close) / previous_close,
        }
    }

    pub fn is_down(&self) -> bool {
        self.percent_change < 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Found(Quote),
    NotFound,
}

/// Where quote pages come from.
#[async_trait]
pub trait QuotePage: Sync {
    async fn fetch(&self, ticker: &str) -> Result<String, QuoteError>;
}

/// Plain GET against a URL template containing `{ticker}`.
pub struct HttpQuotePage {
    client: Client,
    url_template: String,
}

impl HttpQuotePage {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpQuotePage {
            client: builder.build()?,
            url_template: config.url_template.clone(),
        })
    }

    pub fn url(&self, ticker: &str) -> String {
        self.url_template.replace(TICKER_PLACEHOLDER, ticker)
    }
}

#[async_trait]
impl QuotePage for HttpQuotePage {
    async fn fetch(&self, ticker: &str) -> Result<String, QuoteError> {
        let url = self.url(ticker);
        debug!(%ticker, %url, "fetching quote page");

        let response = self.client.get(&url).send().await?;
        debug!(%ticker, status = %response.status(), "quote page answered");

        Ok(response.text().await?)
    }
}

pub async fn get_quote<P, E>(page: &P, extractor: &E, ticker: &str) -> Result<Outcome, QuoteError>
where
    P: QuotePage + ?Sized,
    E: FieldExtractor + ?Sized,
{
    let html = page.fetch(ticker).await?;

    if extractor.is_not_found(&html) {
        debug!(%ticker, "no match on the quote site");
        return Ok(Outcome::NotFound);
    }

    // Zero means "no data" here, same as a missed pattern.
    let mut values = [0.0; 4];
    for (value, field) in values.iter_mut().zip(Field::ALL) {
        *value = extractor
            .extract(field, &html)
            .filter(|v| *v != 0.0 && !v.is_nan())
            .ok_or(QuoteError::MissingField(field))?;
    }

    let [price, previous_close, year_low, year_high] = values;
    Ok(Outcome::Found(Quote::new(
        ticker,
        price,
        previous_close,
        year_low,
        year_high,
    )))
}


#[cfg(test)]
mod tests {
    use super::testing::{not_found_page, quote_page, CannedPages};
    use super::*;
    use crate::extract::GoogleFinance;

    #[tokio::test]
    async fn builds_quote_from_page() {
        let pages = CannedPages::default().with("AAAA11", quote_page("10.00", "9.00", "8.00", "12.00"));

        let quote = match get_quote(&pages, &GoogleFinance, "AAAA11").await.unwrap() {
            Outcome::Found(quote) => quote,
            other => panic!("expected a quote, got {other:?}"),
        };

        assert_eq!(quote.symbol, "AAAA11");
        assert_eq!(quote.price, 10.0);
        assert_eq!(quote.previous_close, 9.0);
        assert_eq!(quote.year_low, 8.0);
        assert_eq!(quote.year_high, 12.0);
        assert_eq!(quote.percent_change, (10.0 - 9.0) / 9.0);
        assert!(!quote.is_down());
    }

    #[tokio::test]
    async fn not_found_page_is_not_an_error() {
        let pages = CannedPages::default().with("ZZZZ3", not_found_page());

        let outcome = get_quote(&pages, &GoogleFinance, "ZZZZ3").await.unwrap();
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn zero_field_counts_as_missing() {
        let pages = CannedPages::default().with("AAAA11", quote_page("10.00", "0.00", "8.00", "12.00"));

        let err = get_quote(&pages, &GoogleFinance, "AAAA11").await.unwrap_err();
        assert!(matches!(err, QuoteError::MissingField(Field::PreviousClose)));
    }

    #[tokio::test]
    async fn first_missing_field_is_reported() {
        let html = r#"<div class="YMlKec fxKbKc">R$10.00</div><div>nothing else</div>"#;
        let pages = CannedPages::default().with("AAAA11", html);

        let err = get_quote(&pages, &GoogleFinance, "AAAA11").await.unwrap_err();
        assert!(matches!(err, QuoteError::MissingField(Field::PreviousClose)));
        assert_eq!(err.to_string(), "failed to parse previous close");
    }

    #[tokio::test]
    async fn network_failure_propagates() {
        let err = get_quote(&CannedPages::default(), &GoogleFinance, "AAAA11")
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::Http(_)));
    }

    #[test]
    fn negative_change_is_down() {
        let quote = Quote::new("BBDC4", 9.0, 10.0, 8.0, 12.0);
        assert!(quote.is_down());
        assert_eq!(quote.percent_change, -0.1);

        let flat = Quote::new("BBDC4", 10.0, 10.0, 8.0, 12.0);
        assert_eq!(flat.percent_change, 0.0);
        assert!(!flat.is_down());
    }

    #[test]
    fn url_template_takes_ticker() {
        let config = Config {
            url_template: "http://localhost:8080/q/{ticker}?hl=en".to_string(),
            timeout: None,
        };
        let page = HttpQuotePage::new(&config).unwrap();
        assert_eq!(page.url("B3SA3"), "http://localhost:8080/q/B3SA3?hl=en");
    }
}
