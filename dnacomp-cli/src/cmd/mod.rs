pub(crate) mod compress;
pub(crate) mod decompress;
pub(crate) mod stats;
