use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::context::{Context, ContextOrder};
use crate::sequence::{Acid, Symbol};

/// Error occurring when querying or updating a [`ContextModel`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ModelError {
    /// Context key outside of the model's key space.
    InvalidContext(Context, ContextOrder),
    /// The model parameters violate one of their constraints.
    InvalidParams(String),
}

impl ModelError {
    #[must_use]
    pub fn invalid_params<T: Into<String>>(message: T) -> Self {
        Self::InvalidParams(message.into())
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidContext(context, order) => write!(
                f,
                "Invalid context {} for a model of order {}",
                context, order
            ),
            ModelError::InvalidParams(message) => write!(f, "Invalid model params: {}", message),
        }
    }
}

impl Error for ModelError {}

pub type ModelResult<T> = Result<T, ModelError>;

/// Adaptation parameters of a [`ContextModel`].
///
/// Both sides of a stream must use identical parameters; they are stored in
/// the container header.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Minimum value of every count; keeps every symbol encodable.
    pub floor: u16,
    /// Amount added to the observed symbol's count on each update.
    pub increment: u16,
    /// Upper bound of a table's total; exceeding it triggers a rescale.
    pub max_total: u32,
}

impl ModelParams {
    pub const DEFAULT_FLOOR: u16 = 1;
    pub const DEFAULT_INCREMENT: u16 = 1;
    pub const DEFAULT_MAX_TOTAL: u32 = 1 << 16;

    #[must_use]
    pub const fn new(floor: u16, increment: u16, max_total: u32) -> Self {
        Self {
            floor,
            increment,
            max_total,
        }
    }

    /// Checks the parameter constraints.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::model::ModelParams;
    ///
    /// assert!(ModelParams::default().validate().is_ok());
    /// assert!(ModelParams::new(0, 1, 1024).validate().is_err());
    /// assert!(ModelParams::new(1, 1, 8).validate().is_err());
    /// ```
    pub fn validate(&self) -> ModelResult<()> {
        if self.floor == 0 {
            return Err(ModelError::invalid_params("floor must be at least 1"));
        }
        if self.increment == 0 {
            return Err(ModelError::invalid_params("increment must be at least 1"));
        }

        // A table that has just been rescaled must still have room for an
        // increment without rescaling again.
        let min_max_total = 2 * (Acid::SIZE as u64 * self.floor as u64 + self.increment as u64);
        if (self.max_total as u64) < min_max_total {
            return Err(ModelError::InvalidParams(format!(
                "max_total must be at least {} (got {})",
                min_max_total, self.max_total
            )));
        }

        Ok(())
    }

    #[inline]
    #[must_use]
    fn initial_total(&self) -> u64 {
        Acid::SIZE as u64 * self.floor as u64
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_FLOOR,
            Self::DEFAULT_INCREMENT,
            Self::DEFAULT_MAX_TOTAL,
        )
    }
}

/// Per-symbol initial boost, added on top of `floor` in every context.
pub type Seed = [u32; 4];

/// Symbol counts of a single context.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrequencyTable {
    counts: [u32; 4],
    total: u32,
}

impl FrequencyTable {
    #[must_use]
    fn new(counts: [u32; 4]) -> Self {
        Self {
            counts,
            total: counts.iter().sum(),
        }
    }

    #[inline]
    #[must_use]
    pub fn count(&self, acid: Acid) -> u32 {
        self.counts[acid.to_usize()]
    }

    #[inline]
    #[must_use]
    pub fn counts(&self) -> &[u32; 4] {
        &self.counts
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[inline]
    #[must_use]
    pub fn to_distribution(&self) -> Distribution {
        Distribution::from_freqs(self.counts)
    }

    fn rescale(&mut self, floor: u32) {
        for count in self.counts.iter_mut() {
            *count = (*count / 2).max(floor);
        }
        self.total = self.counts.iter().sum();
    }

    #[inline]
    fn observe(&mut self, acid: Acid, params: &ModelParams) {
        let increment = params.increment as u32;
        if self.total as u64 + increment as u64 > params.max_total as u64 {
            self.rescale(params.floor as u32);
        }

        self.counts[acid.to_usize()] += increment;
        self.total += increment;
    }
}

/// Cumulative frequency distribution over `A < C < G < T`.
///
/// `cum_freqs[i]` is the sum of the frequencies of all symbols before symbol
/// `i`; the last element is the total.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Distribution {
    cum_freqs: [u32; 5],
}

impl Distribution {
    /// Creates a distribution out of raw (non-cumulative) frequencies.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::model::Distribution;
    /// use dnacomp::sequence::Acid;
    ///
    /// let dist = Distribution::from_freqs([1, 2, 3, 4]);
    /// assert_eq!(dist.low(Acid::G), 3);
    /// assert_eq!(dist.freq(Acid::G), 3);
    /// assert_eq!(dist.total(), 10);
    /// ```
    #[must_use]
    pub fn from_freqs(freqs: [u32; 4]) -> Self {
        let mut cum_freqs = [0; 5];
        for (i, &freq) in freqs.iter().enumerate() {
            cum_freqs[i + 1] = cum_freqs[i] + freq;
        }

        Self { cum_freqs }
    }

    /// Lower bound of the symbol's range.
    #[inline]
    #[must_use]
    pub fn low(&self, acid: Acid) -> u32 {
        self.cum_freqs[acid.to_usize()]
    }

    /// Width of the symbol's range.
    #[inline]
    #[must_use]
    pub fn freq(&self, acid: Acid) -> u32 {
        let index = acid.to_usize();
        self.cum_freqs[index + 1] - self.cum_freqs[index]
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> u32 {
        self.cum_freqs[Acid::SIZE]
    }

    #[inline]
    #[must_use]
    pub fn freqs(&self) -> [u32; 4] {
        let mut freqs = [0; 4];
        for (i, freq) in freqs.iter_mut().enumerate() {
            *freq = self.cum_freqs[i + 1] - self.cum_freqs[i];
        }
        freqs
    }

    #[inline]
    #[must_use]
    pub fn cum_freqs(&self) -> &[u32; 5] {
        &self.cum_freqs
    }

    /// Returns the symbol whose range contains `value`, or `None` if `value`
    /// is not below the total.
    #[inline]
    #[must_use]
    pub fn symbol_at(&self, value: u32) -> Option<Acid> {
        if value >= self.total() {
            return None;
        }

        let index = self.cum_freqs[1..].partition_point(|&cum_freq| cum_freq <= value);
        Some(Acid::from_usize(index))
    }

    /// Probability of the symbol, as a float.
    #[must_use]
    pub fn probability(&self, acid: Acid) -> f64 {
        self.freq(acid) as f64 / self.total() as f64
    }

    /// Information content of the symbol, in bits.
    #[must_use]
    pub fn cost(&self, acid: Acid) -> f64 {
        -self.probability(acid).log2()
    }
}

/// Adaptive order-k context model over nucleotides.
///
/// Holds one [`FrequencyTable`] per context key in a flat arena indexed by
/// [`Context::get`]; the last slot belongs to the start context.
#[derive(Clone, Debug)]
pub struct ContextModel {
    order: ContextOrder,
    params: ModelParams,
    tables: Vec<FrequencyTable>,
}

impl ContextModel {
    /// Creates a model with every table initialized to `floor`.
    pub fn new(order: ContextOrder, params: ModelParams) -> ModelResult<Self> {
        Self::with_seed(order, params, None)
    }

    /// Creates a model with every table initialized to `floor + seed[s]`.
    ///
    /// # Examples
    /// ```
    /// use dnacomp::context::ContextOrder;
    /// use dnacomp::model::{ContextModel, ModelParams};
    /// use dnacomp::sequence::Acid;
    ///
    /// let order = ContextOrder::new(1).unwrap();
    /// let model = ContextModel::with_seed(order, ModelParams::default(), Some([3, 0, 0, 0])).unwrap();
    ///
    /// let dist = model.predict(order.start_context()).unwrap();
    /// assert_eq!(dist.freq(Acid::A), 4);
    /// assert_eq!(dist.freq(Acid::C), 1);
    /// ```
    pub fn with_seed(
        order: ContextOrder,
        params: ModelParams,
        seed: Option<Seed>,
    ) -> ModelResult<Self> {
        params.validate()?;

        let seed = seed.unwrap_or_default();
        let initial_total = params.initial_total() + seed.iter().map(|&x| x as u64).sum::<u64>();
        if initial_total > params.max_total as u64 {
            return Err(ModelError::InvalidParams(format!(
                "initial counts total ({}) exceed max_total ({})",
                initial_total, params.max_total
            )));
        }

        let mut counts = [0; 4];
        for (count, &boost) in counts.iter_mut().zip(seed.iter()) {
            *count = params.floor as u32 + boost;
        }
        let table = FrequencyTable::new(counts);

        let table_num = order.context_num() as usize + 1;
        Ok(Self {
            order,
            params,
            tables: vec![table; table_num],
        })
    }

    #[inline]
    #[must_use]
    pub fn order(&self) -> ContextOrder {
        self.order
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn start_context(&self) -> Context {
        self.order.start_context()
    }

    #[inline]
    #[must_use]
    pub fn advance(&self, context: Context, acid: Acid) -> Context {
        context.advance(self.order, acid)
    }

    #[inline]
    fn table_index(&self, context: Context) -> ModelResult<usize> {
        let index = context.get() as usize;
        if index >= self.tables.len() {
            return Err(ModelError::InvalidContext(context, self.order));
        }

        Ok(index)
    }

    /// Returns the current frequency table of a context.
    pub fn table(&self, context: Context) -> ModelResult<&FrequencyTable> {
        let index = self.table_index(context)?;
        Ok(&self.tables[index])
    }

    /// Returns the cumulative distribution of a context without changing
    /// the model.
    #[inline]
    pub fn predict(&self, context: Context) -> ModelResult<Distribution> {
        self.table(context).map(FrequencyTable::to_distribution)
    }

    /// Records that `acid` followed `context`.
    #[inline]
    pub fn update(&mut self, context: Context, acid: Acid) -> ModelResult<()> {
        let index = self.table_index(context)?;
        let params = self.params;
        self.tables[index].observe(acid, &params);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::context::{Context, ContextOrder};
    use crate::model::{ContextModel, Distribution, ModelError, ModelParams};
    use crate::sequence::{Acid, Symbol};

    fn order(value: u8) -> ContextOrder {
        ContextOrder::new(value).unwrap()
    }

    #[test]
    fn test_fresh_model_is_uniform() {
        let model = ContextModel::new(order(2), ModelParams::default()).unwrap();
        let dist = model.predict(Context::new(5)).unwrap();

        assert_eq!(dist.freqs(), [1, 1, 1, 1]);
        for acid in Acid::values() {
            assert_relative_eq!(dist.probability(acid), 0.25);
        }
    }

    #[test]
    fn test_predict_is_pure() {
        let model = ContextModel::new(order(1), ModelParams::default()).unwrap();
        let first = model.predict(Context::new(2)).unwrap();
        let second = model.predict(Context::new(2)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_update_increments_symbol() {
        let mut model = ContextModel::new(order(1), ModelParams::new(1, 3, 1024)).unwrap();
        model.update(Context::new(0), Acid::G).unwrap();

        let dist = model.predict(Context::new(0)).unwrap();
        assert_eq!(dist.freqs(), [1, 1, 4, 1]);
        assert_eq!(dist.total(), 7);

        // other contexts are untouched
        assert_eq!(model.predict(Context::new(1)).unwrap().total(), 4);
    }

    #[test]
    fn test_start_context_is_valid() {
        let mut model = ContextModel::new(order(3), ModelParams::default()).unwrap();
        let start = model.start_context();

        assert!(model.predict(start).is_ok());
        assert!(model.update(start, Acid::T).is_ok());
    }

    #[test]
    fn test_invalid_context() {
        let mut model = ContextModel::new(order(1), ModelParams::default()).unwrap();

        assert_eq!(
            model.predict(Context::new(5)),
            Err(ModelError::InvalidContext(Context::new(5), order(1)))
        );
        assert!(model.update(Context::new(100), Acid::A).is_err());
    }

    #[test]
    fn test_floor_keeps_every_symbol_encodable() {
        let params = ModelParams::new(1, 32, 256);
        let mut model = ContextModel::new(order(0), params).unwrap();
        let ctx = Context::new(0);
        for _ in 0..10_000 {
            model.update(ctx, Acid::C).unwrap();
        }

        let dist = model.predict(ctx).unwrap();
        for acid in Acid::values() {
            assert!(dist.freq(acid) >= 1);
            assert!(dist.probability(acid) > 0.0);
        }
    }

    #[test]
    fn test_total_never_exceeds_max_total() {
        let params = ModelParams::new(2, 5, 100);
        let mut model = ContextModel::new(order(0), params).unwrap();
        let ctx = Context::new(0);
        let pattern = [Acid::A, Acid::A, Acid::T, Acid::G, Acid::A, Acid::C];

        for &acid in pattern.iter().cycle().take(5_000) {
            model.update(ctx, acid).unwrap();
            let table = model.table(ctx).unwrap();
            assert!(table.total() <= params.max_total);
            assert_eq!(table.total(), table.counts().iter().sum::<u32>());
            assert!(table.counts().iter().all(|&c| c >= params.floor as u32));
        }
    }

    #[test]
    fn test_rescale_halves_and_preserves_order() {
        let params = ModelParams::new(1, 1, 32);
        let mut model = ContextModel::new(order(0), params).unwrap();
        let ctx = Context::new(0);

        // counts: A=16, C=8, G=3, T=1 -> total 28
        for _ in 0..15 {
            model.update(ctx, Acid::A).unwrap();
        }
        for _ in 0..7 {
            model.update(ctx, Acid::C).unwrap();
        }
        for _ in 0..2 {
            model.update(ctx, Acid::G).unwrap();
        }
        for _ in 0..4 {
            model.update(ctx, Acid::A).unwrap();
        }
        assert_eq!(model.table(ctx).unwrap().counts(), &[20, 8, 3, 1]);
        assert_eq!(model.table(ctx).unwrap().total(), 32);

        // total + 1 > 32: rescale first, then increment
        model.update(ctx, Acid::T).unwrap();
        let table = model.table(ctx).unwrap();
        assert_eq!(table.counts(), &[10, 4, 1, 2]);
        assert_eq!(table.total(), 17);
    }

    #[test]
    fn test_seed_is_applied_to_every_context() {
        let model =
            ContextModel::with_seed(order(1), ModelParams::default(), Some([0, 5, 0, 2])).unwrap();

        for value in 0..=4 {
            let dist = model.predict(Context::new(value)).unwrap();
            assert_eq!(dist.freqs(), [1, 6, 1, 3]);
        }
    }

    #[test]
    fn test_seed_exceeding_max_total() {
        let params = ModelParams::new(1, 1, 64);
        let result = ContextModel::with_seed(order(0), params, Some([100, 0, 0, 0]));

        assert!(matches!(result, Err(ModelError::InvalidParams(_))));
    }

    #[test]
    fn test_params_validation() {
        assert!(ModelParams::new(1, 0, 1024).validate().is_err());
        assert!(ModelParams::new(4, 4, 39).validate().is_err());
        assert!(ModelParams::new(4, 4, 40).validate().is_ok());
    }

    #[test]
    fn test_distribution_symbol_at() {
        let dist = Distribution::from_freqs([2, 0, 5, 1]);

        assert_eq!(dist.symbol_at(0), Some(Acid::A));
        assert_eq!(dist.symbol_at(1), Some(Acid::A));
        assert_eq!(dist.symbol_at(2), Some(Acid::G));
        assert_eq!(dist.symbol_at(6), Some(Acid::G));
        assert_eq!(dist.symbol_at(7), Some(Acid::T));
        assert_eq!(dist.symbol_at(8), None);
    }

    #[test]
    fn test_distribution_cost() {
        let dist = Distribution::from_freqs([1, 1, 2, 4]);

        assert_relative_eq!(dist.cost(Acid::T), 1.0);
        assert_relative_eq!(dist.cost(Acid::A), 3.0);
    }

    #[test]
    fn test_error_display() {
        let error = ModelError::InvalidContext(Context::new(17), order(2));
        assert_eq!(
            format!("{}", error),
            "Invalid context 00000011 for a model of order 2"
        );
    }
}
