use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::{debug, info, trace, warn};

use crate::analysis::{analyze, AnalysisParams, AnalysisReport, OrderSelection};
use crate::coder::{
    check_scale_bits, CoderError, RansDecoder, RansEncoder, DEFAULT_SCALE_BITS,
};
use crate::container::{Container, ContainerHeader, CONTAINER_VERSION};
use crate::context::ContextOrder;
use crate::model::{ContextModel, ModelError, ModelParams};
use crate::progress::{NoProgress, ProgressNotifier};
use crate::sequence::Acid;
use crate::stats::bits_per_symbol;

const PROGRESS_STEP: u64 = 64 * 1024;

/// Error occurring during compression of a sequence.
#[derive(Debug)]
pub enum CompressorError {
    /// The compressor parameters are inconsistent.
    InvalidParams(String),
    /// The context model rejected a query at given position.
    Model { position: u64, source: ModelError },
    /// The entropy coder failed at given position.
    Coder { position: u64, source: CoderError },
    /// I/O error occurred when writing the output.
    IoError(std::io::Error),
    /// Error occurred trying to serialize the container.
    SerializeError(binrw::Error),
}

impl From<std::io::Error> for CompressorError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<binrw::Error> for CompressorError {
    fn from(e: binrw::Error) -> Self {
        Self::SerializeError(e)
    }
}

impl Display for CompressorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressorError::InvalidParams(message) => {
                write!(f, "Invalid compressor params: {}", message)
            }
            CompressorError::Model { position, source } => {
                write!(f, "Model error at position {}: {}", position, source)
            }
            CompressorError::Coder { position, source } => {
                write!(f, "Coder error at position {}: {}", position, source)
            }
            CompressorError::IoError(e) => write!(f, "IO error: {}", e),
            CompressorError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl Error for CompressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompressorError::Model { source, .. } => Some(source),
            CompressorError::Coder { source, .. } => Some(source),
            CompressorError::IoError(e) => Some(e),
            CompressorError::SerializeError(e) => Some(e),
            CompressorError::InvalidParams(_) => None,
        }
    }
}

/// The result of compressing a sequence.
pub type CompressResult<T> = Result<T, CompressorError>;

/// Error occurring during decompression of a container.
#[derive(Debug)]
pub enum DecompressorError {
    /// Container format version this build cannot read.
    InvalidVersion(u8),
    /// The header describes an invalid model or coder configuration.
    InvalidParams(String),
    /// The payload ran out before the declared number of symbols was decoded.
    LengthMismatch { expected: u64, decoded: u64 },
    /// The decoded symbols do not match the checksum stored in the header.
    ChecksumMismatch { expected: u32, actual: u32 },
    /// The context model rejected a query at given position.
    Model { position: u64, source: ModelError },
    /// The entropy decoder failed at given position.
    Coder { position: u64, source: CoderError },
    /// I/O error occurred when reading the input.
    IoError(std::io::Error),
    /// Error occurred trying to deserialize the container.
    SerializeError(binrw::Error),
}

impl From<std::io::Error> for DecompressorError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<binrw::Error> for DecompressorError {
    fn from(e: binrw::Error) -> Self {
        Self::SerializeError(e)
    }
}

impl Display for DecompressorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecompressorError::InvalidVersion(version) => {
                write!(f, "Invalid container version: {}", version)
            }
            DecompressorError::InvalidParams(message) => {
                write!(f, "Invalid container params: {}", message)
            }
            DecompressorError::LengthMismatch { expected, decoded } => write!(
                f,
                "Stream ended after {} of {} symbols",
                decoded, expected
            ),
            DecompressorError::ChecksumMismatch { expected, actual } => write!(
                f,
                "Invalid checksum (actual: {:08X}, expected: {:08X})",
                actual, expected
            ),
            DecompressorError::Model { position, source } => {
                write!(f, "Model error at position {}: {}", position, source)
            }
            DecompressorError::Coder { position, source } => {
                write!(f, "Coder error at position {}: {}", position, source)
            }
            DecompressorError::IoError(e) => write!(f, "IO error: {}", e),
            DecompressorError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl Error for DecompressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecompressorError::Model { source, .. } => Some(source),
            DecompressorError::Coder { source, .. } => Some(source),
            DecompressorError::IoError(e) => Some(e),
            DecompressorError::SerializeError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of decompressing a container.
pub type DecompressResult<T> = Result<T, DecompressorError>;

#[derive(Debug, Clone)]
pub struct CompressorParams {
    order_selection: OrderSelection,
    model_params: ModelParams,
    scale_bits: u8,
    seed: bool,
    seed_weight: u32,
    analysis_limit: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl CompressorParams {
    pub fn builder() -> CompressorParamsBuilder {
        CompressorParamsBuilder::new()
    }

    #[must_use]
    pub fn order_selection(&self) -> OrderSelection {
        self.order_selection
    }

    #[must_use]
    pub fn model_params(&self) -> ModelParams {
        self.model_params
    }

    #[must_use]
    pub fn scale_bits(&self) -> u8 {
        self.scale_bits
    }

    #[must_use]
    pub fn progress_notifier(&self) -> &Arc<dyn ProgressNotifier> {
        &self.progress_notifier
    }

    #[must_use]
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            selection: self.order_selection,
            model_params: self.model_params,
            seed_weight: self.seed.then_some(self.seed_weight),
            limit: self.analysis_limit,
        }
    }

    /// Checks the parameters before any work is done.
    pub fn validate(&self) -> CompressResult<()> {
        self.model_params
            .validate()
            .map_err(|e| CompressorError::InvalidParams(e.to_string()))?;
        check_scale_bits(self.scale_bits)
            .map_err(|e| CompressorError::InvalidParams(e.to_string()))?;

        if self.seed {
            let initial_total = 4 * self.model_params.floor as u64 + self.seed_weight as u64;
            if initial_total > self.model_params.max_total as u64 {
                return Err(CompressorError::InvalidParams(format!(
                    "seed weight {} does not fit in max_total {}",
                    self.seed_weight, self.model_params.max_total
                )));
            }
        }

        Ok(())
    }
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct CompressorParamsBuilder {
    order_selection: OrderSelection,
    model_params: ModelParams,
    scale_bits: u8,
    seed: bool,
    seed_weight: u32,
    analysis_limit: usize,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl CompressorParamsBuilder {
    pub fn new() -> Self {
        Self {
            order_selection: OrderSelection::default(),
            model_params: ModelParams::default(),
            scale_bits: DEFAULT_SCALE_BITS,
            seed: false,
            seed_weight: AnalysisParams::DEFAULT_SEED_WEIGHT,
            analysis_limit: AnalysisParams::DEFAULT_LIMIT,
            progress_notifier: Arc::new(NoProgress),
        }
    }

    pub fn order_selection(&mut self, order_selection: OrderSelection) -> &mut Self {
        let mut new = self;
        new.order_selection = order_selection;
        new
    }

    pub fn fixed_order(&mut self, order: ContextOrder) -> &mut Self {
        self.order_selection(OrderSelection::Fixed(order))
    }

    pub fn max_order(&mut self, max_order: ContextOrder) -> &mut Self {
        self.order_selection(OrderSelection::Auto { max_order })
    }

    pub fn model_params(&mut self, model_params: ModelParams) -> &mut Self {
        let mut new = self;
        new.model_params = model_params;
        new
    }

    pub fn scale_bits(&mut self, scale_bits: u8) -> &mut Self {
        let mut new = self;
        new.scale_bits = scale_bits;
        new
    }

    pub fn seed(&mut self, seed: bool) -> &mut Self {
        let mut new = self;
        new.seed = seed;
        new
    }

    pub fn seed_weight(&mut self, seed_weight: u32) -> &mut Self {
        let mut new = self;
        new.seed_weight = seed_weight;
        new
    }

    pub fn analysis_limit(&mut self, analysis_limit: usize) -> &mut Self {
        let mut new = self;
        new.analysis_limit = analysis_limit;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    pub fn build(&mut self) -> CompressorParams {
        CompressorParams {
            order_selection: self.order_selection,
            model_params: self.model_params,
            scale_bits: self.scale_bits,
            seed: self.seed,
            seed_weight: self.seed_weight,
            analysis_limit: self.analysis_limit,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for CompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct DecompressorParams {
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl DecompressorParams {
    pub fn builder() -> DecompressorParamsBuilder {
        DecompressorParamsBuilder::new()
    }
}

impl Default for DecompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct DecompressorParamsBuilder {
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl DecompressorParamsBuilder {
    pub fn new() -> Self {
        Self {
            progress_notifier: Arc::new(NoProgress),
        }
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    pub fn build(&mut self) -> DecompressorParams {
        DecompressorParams {
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for DecompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct ProgressBatcher<'a> {
    notifier: &'a dyn ProgressNotifier,
    pending: u64,
}

impl<'a> ProgressBatcher<'a> {
    fn new(notifier: &'a dyn ProgressNotifier) -> Self {
        Self {
            notifier,
            pending: 0,
        }
    }

    #[inline]
    fn inc(&mut self) {
        self.pending += 1;
        if self.pending == PROGRESS_STEP {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.pending > 0 {
            self.notifier.processed_bases(self.pending);
            self.pending = 0;
        }
    }
}

/// Compresses `symbols` into a self-describing container.
pub fn compress(symbols: &[Acid], params: &CompressorParams) -> CompressResult<Container> {
    compress_with_report(symbols, params).map(|(container, _)| container)
}

/// Compresses `symbols`, also returning the decisions of the analysis pass.
pub fn compress_with_report(
    symbols: &[Acid],
    params: &CompressorParams,
) -> CompressResult<(Container, AnalysisReport)> {
    params.validate()?;

    let report = analyze(symbols, &params.analysis_params())
        .map_err(|e| CompressorError::InvalidParams(e.to_string()))?;
    let mut model = ContextModel::with_seed(report.order, params.model_params, report.seed)
        .map_err(|e| CompressorError::InvalidParams(e.to_string()))?;
    let mut encoder = RansEncoder::with_capacity(params.scale_bits, symbols.len())
        .map_err(|e| CompressorError::InvalidParams(e.to_string()))?;

    let mut hasher = crc32fast::Hasher::new();
    let mut progress = ProgressBatcher::new(params.progress_notifier.as_ref());
    let mut context = model.start_context();

    for (position, &acid) in symbols.iter().enumerate() {
        let position = position as u64;
        let distribution = model
            .predict(context)
            .map_err(|source| CompressorError::Model { position, source })?;
        encoder
            .encode_symbol(&distribution, acid)
            .map_err(|source| CompressorError::Coder { position, source })?;
        model
            .update(context, acid)
            .map_err(|source| CompressorError::Model { position, source })?;
        context = model.advance(context, acid);

        hasher.update(&[acid.code()]);
        progress.inc();
    }
    progress.flush();

    let payload = encoder
        .finish()
        .map_err(|source| CompressorError::Coder {
            position: symbols.len() as u64,
            source,
        })?;

    let model_params = params.model_params;
    let header = ContainerHeader {
        version: CONTAINER_VERSION,
        scale_bits: params.scale_bits,
        context_order: report.order.get(),
        floor: model_params.floor,
        increment: model_params.increment,
        max_total: model_params.max_total,
        symbol_count: symbols.len() as u64,
        checksum: hasher.finalize(),
        seed_flag: u8::from(report.seed.is_some()),
        seed: report.seed,
    };
    debug!("Container header: {:?}", header);
    info!(
        "Compressed {} bases into {} payload bytes ({:.4} bpb, order {})",
        symbols.len(),
        payload.len(),
        bits_per_symbol(payload.len(), symbols.len()),
        report.order
    );

    Ok((Container::new(header, payload), report))
}

fn model_from_header(header: &ContainerHeader) -> DecompressResult<ContextModel> {
    if header.version != CONTAINER_VERSION {
        return Err(DecompressorError::InvalidVersion(header.version));
    }
    check_scale_bits(header.scale_bits)
        .map_err(|e| DecompressorError::InvalidParams(e.to_string()))?;

    let order = ContextOrder::new(header.context_order).ok_or_else(|| {
        DecompressorError::InvalidParams(format!(
            "context order {} exceeds {}",
            header.context_order,
            ContextOrder::MAX
        ))
    })?;
    if header.seed_flag > 1 {
        return Err(DecompressorError::InvalidParams(format!(
            "invalid seed flag: {}",
            header.seed_flag
        )));
    }

    let params = ModelParams::new(header.floor, header.increment, header.max_total);
    ContextModel::with_seed(order, params, header.seed)
        .map_err(|e| DecompressorError::InvalidParams(e.to_string()))
}

/// Restores the original symbols from a container.
pub fn decompress(container: &Container) -> DecompressResult<Vec<Acid>> {
    decompress_with_params(container, &DecompressorParams::default())
}

pub fn decompress_with_params(
    container: &Container,
    params: &DecompressorParams,
) -> DecompressResult<Vec<Acid>> {
    let header = &container.header;
    debug!("Container header: {:?}", header);

    let mut model = model_from_header(header)?;
    let expected = header.symbol_count;

    let mut decoder = RansDecoder::new(&container.payload, header.scale_bits).map_err(|e| {
        match e {
            CoderError::StreamExhausted => DecompressorError::LengthMismatch {
                expected,
                decoded: 0,
            },
            source => DecompressorError::Coder {
                position: 0,
                source,
            },
        }
    })?;

    // The count comes from untrusted input; don't let it drive the allocation.
    let mut symbols = Vec::with_capacity(expected.min(1 << 24) as usize);
    let mut hasher = crc32fast::Hasher::new();
    let mut progress = ProgressBatcher::new(params.progress_notifier.as_ref());
    let mut context = model.start_context();

    for position in 0..expected {
        let distribution = model
            .predict(context)
            .map_err(|source| DecompressorError::Model { position, source })?;
        let acid = decoder
            .decode_symbol(&distribution)
            .map_err(|e| match e {
                CoderError::StreamExhausted => DecompressorError::LengthMismatch {
                    expected,
                    decoded: position,
                },
                source => DecompressorError::Coder { position, source },
            })?;
        model
            .update(context, acid)
            .map_err(|source| DecompressorError::Model { position, source })?;
        context = model.advance(context, acid);

        hasher.update(&[acid.code()]);
        symbols.push(acid);
        progress.inc();
    }
    progress.flush();

    match decoder.finish() {
        Ok(()) => {}
        Err(CoderError::TrailingData(bytes)) => {
            warn!("{} unused bytes at the end of the payload", bytes);
        }
        Err(source) => {
            return Err(DecompressorError::Coder {
                position: expected,
                source,
            })
        }
    }

    let actual = hasher.finalize();
    if actual != header.checksum {
        return Err(DecompressorError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }
    trace!("Decompressed {} bases", symbols.len());

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use crate::_internal_test_data::{
        random_sequence, PERIODIC_ACGT_10K, RANDOM_100K, SHORT_TEST_SEQUENCE,
        SIMPLE_TEST_SEQUENCE,
    };
    use crate::analysis::OrderSelection;
    use crate::coder::{CoderError, RansDecoder, RansEncoder, RANS_L};
    use crate::container::Container;
    use crate::context::ContextOrder;
    use crate::model::{ContextModel, ModelParams};
    use crate::pipeline::{
        compress, compress_with_report, decompress, decompress_with_params, CompressorError,
        CompressorParams, DecompressorError, DecompressorParams,
    };
    use crate::progress::tests::CountingProgress;
    use crate::sequence::{parse_acids, Acid};
    use crate::stats::bits_per_symbol;

    fn order(value: u8) -> ContextOrder {
        ContextOrder::new(value).unwrap()
    }

    fn round_trip(symbols: &[Acid], params: &CompressorParams) -> Container {
        let container = compress(symbols, params).unwrap();
        let bytes = container.to_bytes().unwrap();
        let read = Container::from_bytes(&bytes).unwrap();
        let decompressed = decompress(&read).unwrap();

        assert_eq!(decompressed, symbols);
        container
    }

    #[test_log::test]
    fn test_round_trip_empty() {
        let container = round_trip(&[], &CompressorParams::default());

        assert_eq!(container.symbol_count(), 0);
        assert_eq!(container.payload, RANS_L.to_be_bytes().to_vec());
    }

    #[test]
    fn test_round_trip_single_symbol() {
        for acid in [Acid::A, Acid::C, Acid::G, Acid::T] {
            round_trip(&[acid], &CompressorParams::default());
        }
    }

    #[test]
    fn test_round_trip_short() {
        round_trip(&SHORT_TEST_SEQUENCE, &CompressorParams::default());
        round_trip(&SIMPLE_TEST_SEQUENCE, &CompressorParams::default());
    }

    #[test]
    fn test_round_trip_all_fixed_orders() {
        let symbols = random_sequence(3000, 42);
        for k in 0..=8 {
            let params = CompressorParams::builder().fixed_order(order(k)).build();
            let container = round_trip(&symbols, &params);
            assert_eq!(container.header.context_order, k);
        }
    }

    #[test]
    fn test_round_trip_custom_params() {
        let params = CompressorParams::builder()
            .max_order(order(6))
            .model_params(ModelParams::new(2, 24, 1024))
            .scale_bits(12)
            .seed(true)
            .seed_weight(64)
            .build();

        let container = round_trip(&RANDOM_100K[..20_000], &params);
        assert!(container.header.seed.is_some());
        assert_eq!(container.header.scale_bits, 12);
        assert_eq!(container.header.max_total, 1024);
    }

    #[test]
    fn test_deterministic() {
        let params = CompressorParams::builder().max_order(order(5)).build();
        let first = compress(&SIMPLE_TEST_SEQUENCE, &params).unwrap();
        let second = compress(&SIMPLE_TEST_SEQUENCE, &params).unwrap();

        assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
    }

    #[test_log::test]
    fn test_periodic_sequence() {
        let params = CompressorParams::builder().fixed_order(order(1)).build();
        let container = round_trip(&PERIODIC_ACGT_10K, &params);

        let bpb = bits_per_symbol(container.payload.len(), PERIODIC_ACGT_10K.len());
        assert!(bpb < 0.1, "{} bpb", bpb);
    }

    #[test]
    fn test_periodic_sequence_auto_order() {
        let (_, report) =
            compress_with_report(&PERIODIC_ACGT_10K, &CompressorParams::default()).unwrap();

        assert_eq!(report.order, order(1));
    }

    #[test_log::test]
    fn test_random_sequence_costs_two_bits() {
        let params = CompressorParams::builder().fixed_order(order(0)).build();
        let container = round_trip(&RANDOM_100K, &params);

        let bpb = bits_per_symbol(container.payload.len(), RANDOM_100K.len());
        assert!((1.98..=2.02).contains(&bpb), "{} bpb", bpb);
    }

    #[test]
    fn test_inflated_symbol_count() {
        let mut container = compress(&SIMPLE_TEST_SEQUENCE, &CompressorParams::default()).unwrap();
        container.header.symbol_count += 100;

        let result = decompress(&container);
        assert!(
            matches!(
                result,
                Err(DecompressorError::LengthMismatch { expected, decoded })
                    if expected == SIMPLE_TEST_SEQUENCE.len() as u64 + 100
                        && decoded == SIMPLE_TEST_SEQUENCE.len() as u64
            ),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_truncated_payload() {
        let params = CompressorParams::builder().fixed_order(order(2)).build();
        let mut container = compress(&RANDOM_100K[..5000], &params).unwrap();
        container.payload.truncate(container.payload.len() / 2);
        container.payload_len = container.payload.len() as u64;

        assert!(matches!(
            decompress(&container),
            Err(DecompressorError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_corrupted_checksum() {
        let mut container = compress(&SIMPLE_TEST_SEQUENCE, &CompressorParams::default()).unwrap();
        container.header.checksum ^= 1;

        assert!(matches!(
            decompress(&container),
            Err(DecompressorError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_trailing_data_is_not_fatal() {
        let mut container = compress(&SIMPLE_TEST_SEQUENCE, &CompressorParams::default()).unwrap();
        container.payload.extend_from_slice(&[0xAB, 0xCD]);
        container.payload_len += 2;

        assert_eq!(decompress(&container).unwrap(), *SIMPLE_TEST_SEQUENCE);
    }

    #[test]
    fn test_invalid_version() {
        let mut container = compress(&SHORT_TEST_SEQUENCE, &CompressorParams::default()).unwrap();
        container.header.version = 2;

        assert!(matches!(
            decompress(&container),
            Err(DecompressorError::InvalidVersion(2))
        ));
    }

    #[test]
    fn test_invalid_header_params() {
        let mut container = compress(&SHORT_TEST_SEQUENCE, &CompressorParams::default()).unwrap();
        container.header.context_order = 13;
        assert!(matches!(
            decompress(&container),
            Err(DecompressorError::InvalidParams(_))
        ));

        let mut container = compress(&SHORT_TEST_SEQUENCE, &CompressorParams::default()).unwrap();
        container.header.floor = 0;
        assert!(matches!(
            decompress(&container),
            Err(DecompressorError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_invalid_compressor_params() {
        let params = CompressorParams::builder().scale_bits(20).build();
        assert!(matches!(
            compress(&SHORT_TEST_SEQUENCE, &params),
            Err(CompressorError::InvalidParams(_))
        ));

        let params = CompressorParams::builder()
            .model_params(ModelParams::new(1, 1, 4))
            .build();
        assert!(params.validate().is_err());

        let params = CompressorParams::builder()
            .seed(true)
            .seed_weight(1 << 20)
            .build();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_progress_is_reported() {
        let progress = Arc::new(CountingProgress::default());
        let params = CompressorParams::builder()
            .fixed_order(order(3))
            .progress_notifier(progress.clone())
            .build();
        let container = compress(&RANDOM_100K, &params).unwrap();
        assert_eq!(progress.bases.load(Ordering::Relaxed), 100_000);

        let progress = Arc::new(CountingProgress::default());
        let params = DecompressorParams::builder()
            .progress_notifier(progress.clone())
            .build();
        decompress_with_params(&container, &params).unwrap();
        assert_eq!(progress.bases.load(Ordering::Relaxed), 100_000);
    }

    #[test]
    fn test_encoder_and_decoder_see_identical_distributions() {
        let symbols = parse_acids("GATTACAGATTACACCCGGGTTTAAAGATTACA").unwrap();
        let k = order(2);
        let params = ModelParams::new(1, 3, 40);

        let mut model = ContextModel::new(k, params).unwrap();
        let mut encoder = RansEncoder::new(12).unwrap();
        let mut context = model.start_context();
        let mut enc_distributions = Vec::new();
        for &acid in &symbols {
            let dist = model.predict(context).unwrap();
            encoder.encode_symbol(&dist, acid).unwrap();
            enc_distributions.push(dist);
            model.update(context, acid).unwrap();
            context = model.advance(context, acid);
        }
        let payload = encoder.finish().unwrap();

        let mut model = ContextModel::new(k, params).unwrap();
        let mut decoder = RansDecoder::new(&payload, 12).unwrap();
        let mut context = model.start_context();
        let mut dec_distributions = Vec::new();
        let mut decoded = Vec::new();
        for _ in 0..symbols.len() {
            let dist = model.predict(context).unwrap();
            let acid = decoder.decode_symbol(&dist).unwrap();
            dec_distributions.push(dist);
            decoded.push(acid);
            model.update(context, acid).unwrap();
            context = model.advance(context, acid);
        }

        assert_eq!(decoder.finish(), Ok(()));
        assert_eq!(decoded, symbols);
        assert_eq!(enc_distributions, dec_distributions);
    }

    #[test]
    fn test_order_selection_is_recorded() {
        let params = CompressorParams::builder()
            .order_selection(OrderSelection::Fixed(order(7)))
            .build();
        let container = compress(&SIMPLE_TEST_SEQUENCE, &params).unwrap();

        assert_eq!(container.header.context_order, 7);
    }

    #[test]
    fn test_error_display() {
        let error = DecompressorError::LengthMismatch {
            expected: 160,
            decoded: 60,
        };
        assert_eq!(format!("{}", error), "Stream ended after 60 of 160 symbols");

        let error = CompressorError::Coder {
            position: 3,
            source: CoderError::ZeroProbabilitySymbol(Acid::T),
        };
        assert_eq!(
            format!("{}", error),
            "Coder error at position 3: Symbol T has zero probability"
        );
    }
}
