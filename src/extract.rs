use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker Google Finance renders when a symbol is unknown on the exchange.
pub const NOT_FOUND_MARKER: &str = "We couldn't find any match for your search";

/// The four numbers scraped from a quote page, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    PreviousClose,
    YearLow,
    YearHigh,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Price,
        Field::PreviousClose,
        Field::YearLow,
        Field::YearHigh,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Price => "price",
            Field::PreviousClose => "previous close",
            Field::YearLow => "year low",
            Field::YearHigh => "year high",
        };
        f.write_str(name)
    }
}

/// Knows how to read quote fields out of one site's markup.
pub trait FieldExtractor {
    /// True when the page says the ticker does not exist.
    fn is_not_found(&self, page: &str) -> bool;

    /// Returns the field's value, or `None` when the pattern misses or the
    /// captured text is not a number.
    fn extract(&self, field: Field, page: &str) -> Option<f64>;
}

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="YMlKec fxKbKc">R\$(.+?)<"#).expect("Failed to compile price regex")
});
static PREVIOUS_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Previous close.+?"P6K39c">R\$(.+?)<"#)
        .expect("Failed to compile previous close regex")
});
static YEAR_LOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Year range.+?class="P6K39c">R\$(.+?) -"#)
        .expect("Failed to compile year low regex")
});
static YEAR_HIGH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Year range.+?class="P6K39c">.+? - R\$(.+?)<"#)
        .expect("Failed to compile year high regex")
});

/// Scrapes the English Google Finance page of a B3 (BVMF) listing.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleFinance;

impl GoogleFinance {
    fn pattern(field: Field) -> &'static Regex {
        match field {
            Field::Price => &PRICE,
            Field::PreviousClose => &PREVIOUS_CLOSE,
            Field::YearLow => &YEAR_LOW,
            Field::YearHigh => &YEAR_HIGH,
        }
    }
}

impl FieldExtractor for GoogleFinance {
    fn is_not_found(&self, page: &str) -> bool {
        page.contains(NOT_FOUND_MARKER)
    }

    fn extract(&self, field: Field, page: &str) -> Option<f64> {
        let captures = Self::pattern(field).captures(page)?;
        parse_leading_number(captures.get(1)?.as_str())
    }
}

/// Parses the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// Anything after the number is dropped, so `"10,00"` reads as `10` and
/// `"1,234.50"` as `1`. Returns `None` when no digits lead the text.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - (end + 1);
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}
