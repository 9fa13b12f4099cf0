use super::ui;
use crate::config::{AppConfig, ForexConfig, InstrumentConfig};
use crate::core::pipeline::{performance_in, prepare_forex_pair, prepare_series};
use crate::core::{ForexPair, HistoryProvider, PriceHistory, Series};
use crate::storage::json;
use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Cell;
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An instrument converted into the target currency, ready to be stored.
struct PreparedInstrument<'a> {
    config: &'a InstrumentConfig,
    performance: Series,
}

pub async fn run(
    config: &AppConfig,
    provider: &(dyn HistoryProvider + Send + Sync),
) -> Result<()> {
    if config.instruments.is_empty() {
        bail!("No instruments configured, nothing to fetch");
    }

    let data_path = config.default_data_path()?;
    info!(
        "Fetching {} instruments into {}",
        config.instruments.len(),
        data_path.display()
    );

    let prepared = prepare_all(
        &config.instruments,
        &config.forex,
        &config.currency,
        provider,
    )
    .await?;
    let written = write_all(&prepared, &data_path)?;
    display_prepared(&prepared, &written, &config.currency);
    Ok(())
}

/// Fetches every instrument and forex history, then converts each
/// instrument. The first failure aborts, so nothing is written unless every
/// instrument made it through.
async fn prepare_all<'a>(
    instruments: &'a [InstrumentConfig],
    forex: &[ForexConfig],
    target_currency: &str,
    provider: &(dyn HistoryProvider + Send + Sync),
) -> Result<Vec<PreparedInstrument<'a>>> {
    let mut symbols: Vec<&str> = instruments.iter().map(|i| i.symbol.as_str()).collect();
    symbols.extend(forex.iter().map(|f| f.symbol.as_str()));
    symbols.sort_unstable();
    symbols.dedup();

    // Step 1: Fetch all histories concurrently
    let pb = ui::new_progress_bar(symbols.len() as u64);
    let futures = symbols.iter().map(|symbol| {
        let pb_clone = pb.clone();
        async move {
            let result = provider.fetch_history(symbol).await;
            pb_clone.set_message(symbol.to_string());
            pb_clone.inc(1);
            (symbol.to_string(), result)
        }
    });
    let histories: HashMap<String, Result<PriceHistory>> =
        join_all(futures).await.into_iter().collect();
    pb.finish_and_clear();

    // Step 2: Rates first, so every instrument sees the same pairs
    let pairs = build_forex_pairs(forex, &histories)?;

    // Step 3: Normalize and convert each instrument
    instruments
        .iter()
        .map(|instrument| {
            prepare_instrument(instrument, &histories, target_currency, &pairs)
                .with_context(|| {
                    format!("Failed to load {} ({})", instrument.name, instrument.symbol)
                })
                .map(|performance| PreparedInstrument {
                    config: instrument,
                    performance,
                })
        })
        .collect()
}

fn history_for(
    histories: &HashMap<String, Result<PriceHistory>>,
    symbol: &str,
) -> Result<PriceHistory> {
    match histories.get(symbol) {
        Some(Ok(history)) => Ok(history.clone()),
        Some(Err(e)) => Err(anyhow!("{e:#}")),
        None => Err(anyhow!("No history fetched for symbol: {symbol}")),
    }
}

fn build_forex_pairs(
    forex: &[ForexConfig],
    histories: &HashMap<String, Result<PriceHistory>>,
) -> Result<Vec<ForexPair>> {
    forex
        .iter()
        .map(|f| {
            let history = history_for(histories, &f.symbol)
                .with_context(|| format!("Failed to load forex {}", f.symbol))?;
            let pair = prepare_forex_pair(&f.base, &f.quote, &history)?;
            debug!(
                "Forex {} ({} -> {}): {}",
                f.symbol,
                f.base,
                f.quote,
                pair.rates.date_range()
            );
            Ok(pair)
        })
        .collect()
}

fn prepare_instrument(
    instrument: &InstrumentConfig,
    histories: &HashMap<String, Result<PriceHistory>>,
    target_currency: &str,
    pairs: &[ForexPair],
) -> Result<Series> {
    let history = history_for(histories, &instrument.symbol)?;
    let series = prepare_series(&instrument.name, &history)?;
    Ok(performance_in(&series, target_currency, pairs)?)
}

fn write_all(prepared: &[PreparedInstrument<'_>], data_path: &Path) -> Result<Vec<PathBuf>> {
    prepared
        .iter()
        .map(|p| {
            let path = data_path.join(format!("{}.json", p.config.name));
            json::write_series(&path, &p.performance)?;
            info!(
                "Saved {} ({} days, {}) to {}",
                p.config.name,
                p.performance.len(),
                p.performance.date_range(),
                path.display()
            );
            Ok(path)
        })
        .collect()
}

fn display_prepared(prepared: &[PreparedInstrument<'_>], written: &[PathBuf], currency: &str) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell(&format!("Performance ({currency})")),
        ui::header_cell("File"),
    ]);

    for (p, path) in prepared.iter().zip(written) {
        table.add_row(vec![
            ui::name_cell(&p.config.name),
            Cell::new(&p.config.symbol),
            Cell::new(p.performance.first_date()),
            Cell::new(p.performance.last_date()),
            ui::change_cell(p.performance.last().value),
            Cell::new(ui::style_text(
                &path.display().to_string(),
                ui::StyleType::Subtle,
            )),
        ]);
    }

    println!("{table}");
}
