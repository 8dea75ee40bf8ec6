mod args;
mod config;
mod extract;
mod report;
mod stocks;
mod telemetry;

use std::io;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use tracing::info;

use crate::args::Args;
use crate::config::Config;
use crate::extract::GoogleFinance;
use crate::stocks::HttpQuotePage;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    telemetry::init_tracing("warn");

    let args = Args::parse();
    let config = Config::from_env()?;
    let tickers = args.tickers();
    info!(?tickers, url_template = %config.url_template, "quoting");

    let page = HttpQuotePage::new(&config).wrap_err("Failed to build HTTP client")?;

    report::run(&tickers, &page, &GoogleFinance, &mut io::stdout(), &mut io::stderr())
        .await
        .wrap_err("Failed to write the report")?;

    Ok(())
}
