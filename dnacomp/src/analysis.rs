use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::context::ContextOrder;
use crate::model::{ContextModel, ModelError, ModelParams, ModelResult, Seed};
use crate::sequence::{Acid, Symbol};

/// How the context order of a stream is chosen.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OrderSelection {
    /// Try every order in `0..=max_order` and keep the cheapest one.
    Auto { max_order: ContextOrder },
    /// Always use the given order.
    Fixed(ContextOrder),
}

impl Default for OrderSelection {
    fn default() -> Self {
        Self::Auto {
            max_order: ContextOrder::default(),
        }
    }
}

/// Estimated cost of coding a sequence with a model of given order.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderEstimate {
    pub order: ContextOrder,
    pub bits: f64,
    pub bits_per_symbol: f64,
}

/// Result of the analysis pass: everything the decoder needs to rebuild the
/// model, plus the per-order estimates that led to the decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub order: ContextOrder,
    pub seed: Option<Seed>,
    pub estimates: Vec<OrderEstimate>,
}

#[derive(Copy, Clone, Debug)]
pub struct AnalysisParams {
    pub selection: OrderSelection,
    pub model_params: ModelParams,
    /// Weight of the global frequency seed, or `None` to disable seeding.
    pub seed_weight: Option<u32>,
    /// Maximum number of leading symbols used to estimate order costs.
    pub limit: usize,
}

impl AnalysisParams {
    pub const DEFAULT_LIMIT: usize = 16 * 1024 * 1024;
    pub const DEFAULT_SEED_WEIGHT: u32 = 16;
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            selection: OrderSelection::default(),
            model_params: ModelParams::default(),
            seed_weight: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Counts every symbol of the sequence and scales the counts so that they
/// sum up to (at most) `weight`.
///
/// # Examples
/// ```
/// use dnacomp::analysis::global_seed;
/// use dnacomp::sequence::Acid;
///
/// let seed = global_seed(&[Acid::A, Acid::A, Acid::A, Acid::T], 8);
/// assert_eq!(seed, Some([6, 0, 0, 2]));
/// assert_eq!(global_seed(&[], 8), None);
/// ```
#[must_use]
pub fn global_seed(symbols: &[Acid], weight: u32) -> Option<Seed> {
    if symbols.is_empty() {
        return None;
    }

    let mut counts = [0_u64; 4];
    for acid in symbols {
        counts[acid.to_usize()] += 1;
    }

    let n = symbols.len() as u64;
    let mut seed = [0; 4];
    for (boost, &count) in seed.iter_mut().zip(counts.iter()) {
        *boost = (count * weight as u64 / n) as u32;
    }
    Some(seed)
}

/// Highest order worth estimating for a sample of `len` symbols, capped at
/// `max_order`.
///
/// Above `ceil(log4(len))` almost every context occurs at most once, so
/// longer histories cannot help while the model arena keeps growing 4x per
/// order.
///
/// # Examples
/// ```
/// use dnacomp::analysis::useful_max_order;
/// use dnacomp::context::ContextOrder;
///
/// let max_order = ContextOrder::new(10).unwrap();
/// assert_eq!(useful_max_order(max_order, 0).get(), 0);
/// assert_eq!(useful_max_order(max_order, 16).get(), 2);
/// assert_eq!(useful_max_order(max_order, 26).get(), 3);
/// assert_eq!(useful_max_order(max_order, 1 << 30).get(), 10);
/// ```
#[must_use]
pub fn useful_max_order(max_order: ContextOrder, len: usize) -> ContextOrder {
    let mut order = 0;
    while order < max_order.get() && (1_u64 << (2 * order as u32)) < len as u64 {
        order += 1;
    }

    ContextOrder::new(order).unwrap_or(max_order)
}

/// Simulates the adaptive model over `symbols` and returns the ideal code
/// length, in bits.
pub fn estimate_cost(
    symbols: &[Acid],
    order: ContextOrder,
    params: ModelParams,
    seed: Option<Seed>,
) -> ModelResult<f64> {
    let mut model = ContextModel::with_seed(order, params, seed)?;
    let mut context = model.start_context();
    let mut bits = 0.0;

    for &acid in symbols {
        let table = model.table(context)?;
        bits += (table.total() as f64 / table.count(acid) as f64).log2();
        model.update(context, acid)?;
        context = model.advance(context, acid);
    }

    Ok(bits)
}

/// Decides the model configuration for `symbols`.
pub fn analyze(symbols: &[Acid], params: &AnalysisParams) -> ModelResult<AnalysisReport> {
    let seed = match params.seed_weight {
        Some(weight) => {
            let initial_total = Acid::SIZE as u64 * params.model_params.floor as u64;
            if initial_total + weight as u64 > params.model_params.max_total as u64 {
                return Err(ModelError::InvalidParams(format!(
                    "seed weight {} does not fit in max_total {}",
                    weight, params.model_params.max_total
                )));
            }
            global_seed(symbols, weight)
        }
        None => None,
    };

    let max_order = match params.selection {
        OrderSelection::Fixed(order) => {
            debug!("Using fixed context order {}", order);
            return Ok(AnalysisReport {
                order,
                seed,
                estimates: Vec::new(),
            });
        }
        OrderSelection::Auto { max_order } => max_order,
    };

    let sample = &symbols[..symbols.len().min(params.limit)];
    let sample_len = sample.len().max(1) as f64;
    let max_order = useful_max_order(max_order, sample.len());
    let orders: Vec<ContextOrder> = max_order.up_to().collect();

    let estimates = orders
        .into_par_iter()
        .map(|order| {
            let bits = estimate_cost(sample, order, params.model_params, seed)?;
            Ok(OrderEstimate {
                order,
                bits,
                bits_per_symbol: bits / sample_len,
            })
        })
        .collect::<ModelResult<Vec<OrderEstimate>>>()?;

    for estimate in &estimates {
        debug!(
            "Order {:>2}: {:.1} bits ({:.4} bits/base)",
            estimate.order, estimate.bits, estimate.bits_per_symbol
        );
    }

    let mut best = estimates[0];
    for estimate in &estimates[1..] {
        if estimate.bits < best.bits {
            best = *estimate;
        }
    }
    info!(
        "Selected context order {} ({:.4} bits/base estimated over {} bases)",
        best.order,
        best.bits_per_symbol,
        sample.len()
    );

    Ok(AnalysisReport {
        order: best.order,
        seed,
        estimates,
    })
}
