//! Multi-symbol opportunity scanning.
//!
//! Runs the full pattern/confluence pipeline per symbol (in parallel), isolates per-symbol
//! failures behind a placeholder result, then filters and ranks what is left.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::analysis::multi_timeframe::aggregate;
use crate::analysis::symbol_scan::scan_symbol;
use crate::config::{ANALYSIS, ConfluenceConfig, PRINT_RANKER_FILTERS};
use crate::domain::Candle;
use crate::models::{
    CandleSeries, ConfluenceResult, IndicatorScores, LevelSet, Signal, TimeframeScore,
    TimeframeStatus,
};

/// Source of candles, prices and indicator snapshots for the scanner.
/// Implementations must be shareable across the worker threads of a batch scan.
pub trait MarketDataProvider: Send + Sync {
    /// Up to `count` most recent candles, oldest first
    fn candles(&self, symbol: &str, timeframe: &str, count: usize) -> Result<Vec<Candle>>;

    fn price(&self, symbol: &str) -> Result<f64>;

    /// Indicator snapshot for one timeframe, if the provider has one
    fn indicator_scores(&self, symbol: &str, timeframe: &str) -> Option<IndicatorScores>;

    /// A unique identifier for this implementation (useful in logs)
    fn signature(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Neutral,
    /// Analysis failed for this symbol
    Unknown,
}

impl From<Signal> for Direction {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Long => Direction::Long,
            Signal::Short => Direction::Short,
            Signal::Neutral => Direction::Neutral,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DirectionFilter {
    Long,
    Short,
    #[default]
    Both,
}

impl DirectionFilter {
    pub fn accepts(&self, direction: Direction) -> bool {
        match self {
            DirectionFilter::Both => true,
            DirectionFilter::Long => direction == Direction::Long,
            DirectionFilter::Short => direction == Direction::Short,
        }
    }
}

/// Runtime filters to trim scanner output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerFilters {
    pub min_probability: f64,
    pub direction: DirectionFilter,
    pub risk_reward_min: Option<f64>,
    /// Whitelist; `None` or empty keeps every symbol
    pub symbols: Option<Vec<String>>,
    pub max_results: usize,
}

impl Default for ScannerFilters {
    fn default() -> Self {
        Self {
            min_probability: ANALYSIS.scanner.min_probability,
            direction: DirectionFilter::Both,
            risk_reward_min: None,
            symbols: None,
            max_results: ANALYSIS.scanner.max_results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: String,
    pub direction: Direction,
    pub probability: f64,
    pub price: f64,
    /// `|long - short|` of the aggregated probabilities
    pub confluence_score: f64,
    pub risk_reward: Option<f64>,
    /// 1-based position after ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confluence: Option<ConfluenceResult>,
    #[serde(default)]
    pub timeframe_status: BTreeMap<String, TimeframeStatus>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Opportunity {
    /// Zero-confidence placeholder for a symbol whose analysis failed
    pub fn unavailable(symbol: &str, error: &anyhow::Error) -> Self {
        Self {
            symbol: symbol.to_string(),
            direction: Direction::Unknown,
            probability: 0.0,
            price: 0.0,
            confluence_score: 0.0,
            risk_reward: None,
            rank: None,
            confluence: None,
            timeframe_status: BTreeMap::new(),
            notes: vec![format!("Failed to analyze: {:#}", error)],
        }
    }
}

/// Structure-based reward/risk: targets and stops come from the nearest levels across
/// every timeframe. `None` for NEUTRAL or when either side has no level.
pub fn structure_risk_reward(
    direction: Direction,
    price: f64,
    levels: &BTreeMap<String, LevelSet>,
) -> Option<f64> {
    let above = levels
        .values()
        .filter_map(|set| set.nearest_resistance_above(price))
        .min_by(|a, b| a.total_cmp(b));
    let below = levels
        .values()
        .filter_map(|set| set.nearest_support_below(price))
        .max_by(|a, b| a.total_cmp(b));

    let (reward, risk) = match direction {
        Direction::Long => (above? - price, price - below?),
        Direction::Short => (price - below?, above? - price),
        Direction::Neutral | Direction::Unknown => return None,
    };

    (risk > 0.0).then(|| reward / risk)
}

fn describe_timeframes(
    timeframes: &[String],
    scores_by_timeframe: &BTreeMap<String, IndicatorScores>,
    timeframe_status: &BTreeMap<String, TimeframeStatus>,
    direction: Direction,
    neutral_score: f64,
) -> Vec<String> {
    let mut notes = Vec::new();
    for tf in timeframes {
        if let Some(status) = timeframe_status.get(tf)
            && !status.is_ok()
        {
            notes.push(format!("{}: skipped ({})", tf, status.detail()));
            continue;
        }
        let Some(scores) = scores_by_timeframe.get(tf) else {
            continue;
        };
        let resolved = TimeframeScore::resolve(scores, neutral_score);
        let probability = match direction {
            Direction::Long => resolved.long_probability,
            Direction::Short => resolved.short_probability,
            _ => resolved.long_probability.max(resolved.short_probability),
        };
        notes.push(format!(
            "{}: {} bias, volatility {}, {} prob {:.1}%",
            tf,
            scores.trend_bias.as_deref().unwrap_or("neutral").to_uppercase(),
            scores.volatility_regime.as_deref().unwrap_or("unknown"),
            direction,
            probability
        ));
    }
    notes
}

/// Fetch, scan and aggregate one symbol.
///
/// Base scores come from the first requested timeframe that has an indicator snapshot.
pub fn analyze_symbol<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbol: &str,
    timeframes: &[String],
    candles_per_timeframe: usize,
    config: &ConfluenceConfig,
) -> Result<Opportunity> {
    let price = provider
        .price(symbol)
        .context(format!("Failed to get price for {}", symbol))?;
    if !price.is_finite() || price <= 0.0 {
        bail!("Invalid price {} for {}", price, symbol);
    }

    let mut frames = BTreeMap::new();
    let mut scores_by_timeframe = BTreeMap::new();
    for tf in timeframes {
        let candles = provider
            .candles(symbol, tf, candles_per_timeframe)
            .context(format!("Failed to get {} candles for {}", tf, symbol))?;
        frames.insert(tf.clone(), CandleSeries::new(tf.as_str(), candles));

        if let Some(scores) = provider.indicator_scores(symbol, tf) {
            scores_by_timeframe.insert(tf.clone(), scores);
        }
    }

    let scan = scan_symbol(symbol, &frames, timeframes, price, config);
    if scan.ok_timeframes().next().is_none() {
        log::warn!(
            "{}: no timeframe had enough candles, scoring on indicators only",
            symbol
        );
    }

    let base_scores = timeframes
        .iter()
        .find_map(|tf| scores_by_timeframe.get(tf))
        .cloned()
        .unwrap_or_default();

    let confluence = aggregate(
        &scan.patterns,
        &scan.levels,
        &base_scores,
        &scores_by_timeframe,
        price,
        config,
    );

    let direction = Direction::from(confluence.signal);
    let notes = describe_timeframes(
        timeframes,
        &scores_by_timeframe,
        &scan.timeframe_status,
        direction,
        config.neutral_score,
    );

    Ok(Opportunity {
        symbol: symbol.to_string(),
        direction,
        probability: confluence.primary_probability,
        price,
        confluence_score: (confluence.long_probability - confluence.short_probability).abs(),
        risk_reward: structure_risk_reward(direction, price, &scan.levels),
        rank: None,
        confluence: Some(confluence),
        timeframe_status: scan.timeframe_status,
        notes,
    })
}

/// Sort by probability (descending, stable) and number the list from 1
pub fn rank_opportunities(mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    opportunities.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    for (i, opp) in opportunities.iter_mut().enumerate() {
        opp.rank = Some(i + 1);
    }
    opportunities
}

fn rejection_reason(opp: &Opportunity, filters: &ScannerFilters) -> Option<String> {
    if let Some(symbols) = &filters.symbols
        && !symbols.is_empty()
        && !symbols.contains(&opp.symbol)
    {
        return Some("not in symbol list".to_string());
    }
    if opp.probability < filters.min_probability {
        return Some(format!(
            "probability {:.1} < {:.1}",
            opp.probability, filters.min_probability
        ));
    }
    if !filters.direction.accepts(opp.direction) {
        return Some(format!("direction {} != {}", opp.direction, filters.direction));
    }
    if let Some(min_rr) = filters.risk_reward_min
        && opp.risk_reward.unwrap_or(0.0) < min_rr
    {
        return Some(format!("risk/reward below {:.2}", min_rr));
    }
    None
}

/// Whitelist, probability, direction and R:R filters, then rank and truncate
pub fn apply_filters(opportunities: Vec<Opportunity>, filters: &ScannerFilters) -> Vec<Opportunity> {
    let kept: Vec<Opportunity> = opportunities
        .into_iter()
        .filter(|opp| match rejection_reason(opp, filters) {
            Some(reason) => {
                if PRINT_RANKER_FILTERS {
                    log::info!("Dropping {}: {}", opp.symbol, reason);
                }
                false
            }
            None => true,
        })
        .collect();

    let mut ranked = rank_opportunities(kept);
    ranked.truncate(filters.max_results);
    ranked
}

/// Analyse every symbol in parallel and return the filtered, ranked opportunities.
/// A failing symbol becomes an [`Opportunity::unavailable`] placeholder and never aborts the batch;
/// that includes a provider that panics.
pub fn scan_markets<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbols: &[String],
    filters: &ScannerFilters,
    timeframes: &[String],
    config: &ConfluenceConfig,
) -> Vec<Opportunity> {
    log::info!(
        "Scanning {} symbols over [{}] using {}",
        symbols.len(),
        timeframes.join(", "),
        provider.signature()
    );

    let opportunities: Vec<Opportunity> = symbols
        .par_iter()
        .map(|symbol| {
            match analyze_isolated(provider, symbol, timeframes, config) {
                Ok(opp) => opp,
                Err(e) => {
                    log::warn!("Failed to analyze {}: {:#}", symbol, e);
                    Opportunity::unavailable(symbol, &e)
                }
            }
        })
        .collect();

    apply_filters(opportunities, filters)
}

/// [`analyze_symbol`] with a panic turned into an error for that symbol alone
fn analyze_isolated<P: MarketDataProvider + ?Sized>(
    provider: &P,
    symbol: &str,
    timeframes: &[String],
    config: &ConfluenceConfig,
) -> Result<Opportunity> {
    catch_unwind(AssertUnwindSafe(|| {
        analyze_symbol(
            provider,
            symbol,
            timeframes,
            config.candles_per_timeframe,
            config,
        )
    }))
    .unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(anyhow!("Analysis of {} panicked: {}", symbol, message))
    })
}
