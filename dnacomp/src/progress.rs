use std::fmt::Debug;

use derive_more::{Add, AddAssign};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Add, AddAssign)]
#[repr(transparent)]
pub struct ByteNum(usize);

impl ByteNum {
    pub const ZERO: ByteNum = ByteNum(0);

    #[inline]
    #[must_use]
    pub const fn new(bytes: usize) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Receives progress updates from long-running operations.
///
/// Calls may come from several worker threads at once.
pub trait ProgressNotifier: Debug + Send + Sync {
    /// Raw input bytes consumed since the last call.
    fn processed_bytes(&self, bytes: ByteNum);

    /// Number of records the current operation is going to go through.
    fn set_record_num(&self, record_num: u64);

    /// One more record is done.
    fn record_finished(&self);

    /// Bases coded since the last call; reported in batches.
    fn processed_bases(&self, _bases: u64) {}
}

impl<T: ProgressNotifier> ProgressNotifier for &T {
    fn processed_bytes(&self, bytes: ByteNum) {
        T::processed_bytes(self, bytes)
    }

    fn set_record_num(&self, record_num: u64) {
        T::set_record_num(self, record_num)
    }

    fn record_finished(&self) {
        T::record_finished(self)
    }

    fn processed_bases(&self, bases: u64) {
        T::processed_bases(self, bases)
    }
}

/// A notifier that ignores every update.
#[derive(Clone, Debug, Default)]
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn processed_bytes(&self, _bytes: ByteNum) {}

    fn set_record_num(&self, _record_num: u64) {}

    fn record_finished(&self) {}
}
