use std::io::{self, Write};

use crossterm::style::Stylize;
use futures::stream::{FuturesUnordered, StreamExt};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{error, info};

use crate::extract::{FieldExtractor, NOT_FOUND_MARKER};
use crate::stocks::{get_quote, Outcome, Quote, QuotePage};

pub const HEADER: [&str; 2] = [
    "COD\tPRICE\tPREV\tY.LOW\tY.HIGH\tDIFF",
    "---\t-----\t----\t-----\t------\t----",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub printed: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Two decimals, `,` for decimals and `.` between thousands: `1234.5` -> `1.234,50`.
/// Ties round away from zero; negatives keep their sign even at `-0,00`.
pub fn format_number(value: f64) -> String {
    let Some(abs) = Decimal::from_f64_retain(value.abs()) else {
        return value.to_string();
    };
    let fixed = format!(
        "{:.2}",
        abs.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    );
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

pub fn format_percent(fraction: f64) -> String {
    format!("{}%", format_number(fraction * 100.0))
}

/// Red when down, green otherwise; flat counts as green.
pub fn paint(text: String, down: bool) -> String {
    if down {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// The six cells of a row, colors applied.
pub fn row_cells(quote: &Quote) -> [String; 6] {
    let down = quote.is_down();
    [
        quote.symbol.clone(),
        paint(format_number(quote.price), down),
        format_number(quote.previous_close),
        format_number(quote.year_low),
        format_number(quote.year_high),
        paint(format_percent(quote.percent_change), down),
    ]
}

pub fn write_header<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    for line in HEADER {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// One write per cell, then the newline.
pub fn write_row<W: Write + ?Sized>(out: &mut W, quote: &Quote) -> io::Result<()> {
    for (i, cell) in row_cells(quote).iter().enumerate() {
        if i > 0 {
            out.write_all(b"\t")?;
        }
        out.write_all(cell.as_bytes())?;
    }
    out.write_all(b"\n")?;
    out.flush()
}

pub fn write_not_found<W: Write + ?Sized>(out: &mut W, ticker: &str) -> io::Result<()> {
    writeln!(out, "{NOT_FOUND_MARKER}: {ticker}")?;
    out.flush()
}

/// Prints the header, then quotes every ticker at once and writes each
/// result as it lands. A failed ticker gets one line on `err`; the rest
/// carry on.
pub async fn run<P, E, O, W>(
    tickers: &[String],
    page: &P,
    extractor: &E,
    out: &mut O,
    err: &mut W,
) -> io::Result<Summary>
where
    P: QuotePage + ?Sized,
    E: FieldExtractor + ?Sized,
    O: Write + ?Sized,
    W: Write + ?Sized,
{
    write_header(out)?;

    let mut pending: FuturesUnordered<_> = tickers
        .iter()
        .map(|ticker| async move { (ticker, get_quote(page, extractor, ticker).await) })
        .collect();

    let mut summary = Summary::default();
    while let Some((ticker, result)) = pending.next().await {
        match result {
            Ok(Outcome::Found(quote)) => {
                write_row(out, &quote)?;
                summary.printed += 1;
            }
            Ok(Outcome::NotFound) => {
                write_not_found(out, ticker)?;
                summary.not_found += 1;
            }
            Err(why) => {
                error!(%ticker, error = %why, "quote failed");
                writeln!(err, "{ticker}: {why}")?;
                summary.failed += 1;
            }
        }
    }

    info!(
        printed = summary.printed,
        not_found = summary.not_found,
        failed = summary.failed,
        "all tickers settled"
    );
    Ok(summary)
}
