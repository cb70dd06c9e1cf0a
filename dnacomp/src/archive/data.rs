use binrw::binrw;

pub(super) const ARCHIVE_VERSION: u8 = 1;

#[binrw]
#[brw(big, magic = b"DNZA")]
#[derive(Debug, Clone, Eq, PartialEq)]
pub(super) struct ArchiveHeader {
    pub version: u8,
    pub policy: u8,
    pub placeholder: u8,
    pub record_num: u32,
}

#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Eq, PartialEq)]
pub(super) struct ArchiveRun {
    pub position: u64,
    pub byte: u8,
    pub length: u32,
}

#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Eq, PartialEq)]
pub(super) struct ArchiveRecord {
    pub has_title: u8,
    pub title_len: u32,
    #[br(count = title_len)]
    pub title: Vec<u8>,
    pub line_width: u32,
    pub run_num: u32,
    #[br(count = run_num)]
    pub runs: Vec<ArchiveRun>,
    pub container_len: u64,
    /// A serialized [`crate::container::Container`].
    #[br(count = container_len)]
    pub container: Vec<u8>,
}
