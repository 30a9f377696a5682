use anyhow::{bail, Result};
use clap::Parser;
use cli::{Cli, Commands::*, TraceLevel};
use colored::Colorize;
use finsite_client::{Backend, BackendExt};
use finsite_core::chart::{self, Viewport};
use finsite_core::model::close_series;
use finsite_core::stats::{format_pct, format_value, SeriesStats};
use finsite_core::{Config, PriceCard};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod ui;

fn preprocess(trace_level: Level) -> Result<Config> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(Config::from_env()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    let config = preprocess(log_level)?;
    trace!("Command line input recorded: {cli:#?}");
    debug!("Configuration: {config:?}");

    let http = reqwest::ClientBuilder::new()
        .user_agent(concat!("finsite/", env!("CARGO_PKG_VERSION")))
        .build()?;

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> finsite <COMMAND>"
    match cli.command {
        // "> finsite watch 2330 [--interval 5000]"
        // poll the price endpoint until ctrl-c
        Watch { ticker, interval } => {
            let interval = match interval {
                Some(0) => bail!("--interval must be greater than zero"),
                Some(ms) => Duration::from_millis(ms),
                None => config.poll_interval,
            };
            let backend = Arc::new(Backend::new(http, config.api_base()));
            info!("Watching {ticker} on {} every {} ms", backend.base(), interval.as_millis());

            let mut card = PriceCard::mount(backend, ticker.clone(), interval);
            let mut rx = card.subscribe();
            let pb = ui::card_spinner(&ticker);
            pb.set_message(ui::card_line(&rx.borrow_and_update()));

            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let line = ui::card_line(&rx.borrow_and_update());
                        pb.set_message(line);
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            card.unmount();
            pb.finish_with_message(ui::card_line(&card.state()));
            debug!("Card for {ticker} unmounted");
        }

        // ---------------------------------------------------------------------------
        // "> finsite chart 2330 --from 2025-01-01 --to 2025-12-31 [-o 2330.svg]"
        // fetch the close series and write it out as an SVG
        Chart { ticker, from, to, out, compact } => {
            let base = config.api_base();
            let series = http.fetch_series(&base, &ticker, &from, &to).await?;
            let points = close_series(&series);

            let stats = SeriesStats::from_series(&points);
            println!(
                "{} {from} → {to}: latest {}, return {}, {} points",
                ticker.bold(),
                format_value(stats.latest).green(),
                format_pct(stats.return_pct()).cyan(),
                stats.count
            );

            let viewport = if compact { Viewport::compact() } else { Viewport::default() };
            let svg = match chart::render_labelled(&points, viewport, &format!("{ticker} close")) {
                chart::Chart::Svg(svg) => svg,
                chart::Chart::NoData => bail!("no data for {ticker} between {from} and {to}"),
            };

            let out = out.unwrap_or_else(|| format!("{ticker}.svg").into());
            tokio::fs::write(&out, svg).await?;
            info!("Chart written to {}", out.display());
        }
    }

    Ok(())
}
