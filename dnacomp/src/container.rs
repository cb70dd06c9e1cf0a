use std::io::{Cursor, Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};

use crate::model::Seed;

/// The only container layout understood by this version: final rANS state
/// first, renormalization bytes after it in decoding order.
pub const CONTAINER_VERSION: u8 = 1;

/// Everything needed to rebuild the model and validate the decoded output.
#[binrw]
#[brw(big, magic = b"DNZC")]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContainerHeader {
    pub version: u8,
    pub scale_bits: u8,
    pub context_order: u8,
    pub floor: u16,
    pub increment: u16,
    pub max_total: u32,
    pub symbol_count: u64,
    /// CRC32 of the 2-bit symbol codes, one byte per symbol.
    pub checksum: u32,
    pub seed_flag: u8,
    #[br(if(seed_flag == 1))]
    pub seed: Option<Seed>,
}

impl ContainerHeader {
    #[must_use]
    pub fn has_seed(&self) -> bool {
        self.seed_flag == 1
    }
}

/// A compressed sequence: header followed by the length-prefixed rANS
/// payload.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Container {
    pub header: ContainerHeader,
    pub payload_len: u64,
    #[br(count = payload_len)]
    pub payload: Vec<u8>,
}

impl Container {
    #[must_use]
    pub fn new(header: ContainerHeader, payload: Vec<u8>) -> Self {
        Self {
            header,
            payload_len: payload.len() as u64,
            payload,
        }
    }

    #[inline]
    #[must_use]
    pub fn symbol_count(&self) -> u64 {
        self.header.symbol_count
    }

    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> BinResult<()> {
        self.write(writer)
    }

    pub fn read_from<R: Read + Seek>(reader: &mut R) -> BinResult<Self> {
        Self::read(reader)
    }

    pub fn to_bytes(&self) -> BinResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    pub fn from_bytes(data: &[u8]) -> BinResult<Self> {
        Self::read_from(&mut Cursor::new(data))
    }
}

#[cfg(test)]
mod tests {
    use crate::container::{Container, ContainerHeader, CONTAINER_VERSION};

    fn header(seed: Option<[u32; 4]>) -> ContainerHeader {
        ContainerHeader {
            version: CONTAINER_VERSION,
            scale_bits: 16,
            context_order: 3,
            floor: 1,
            increment: 2,
            max_total: 0x10000,
            symbol_count: 5,
            checksum: 0xDEADBEEF,
            seed_flag: u8::from(seed.is_some()),
            seed,
        }
    }

    #[test]
    fn test_layout_without_seed() {
        let container = Container::new(header(None), vec![0x00, 0x80, 0x00, 0x00]);
        let bytes = container.to_bytes().unwrap();

        let expected: Vec<u8> = [
            &b"DNZC"[..],
            &[1, 16, 3],
            &[0, 1, 0, 2],
            &[0, 1, 0, 0],
            &[0, 0, 0, 0, 0, 0, 0, 5],
            &[0xDE, 0xAD, 0xBE, 0xEF],
            &[0],
            &[0, 0, 0, 0, 0, 0, 0, 4],
            &[0x00, 0x80, 0x00, 0x00],
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_seed_is_read_back() {
        let container = Container::new(header(Some([1, 2, 3, 4])), vec![7; 10]);
        let bytes = container.to_bytes().unwrap();
        let read = Container::from_bytes(&bytes).unwrap();

        assert_eq!(read, container);
        assert!(read.header.has_seed());
        assert_eq!(read.symbol_count(), 5);
    }

    #[test]
    fn test_invalid_magic() {
        let container = Container::new(header(None), vec![1, 2, 3, 4]);
        let mut bytes = container.to_bytes().unwrap();
        bytes[0] = b'X';

        assert!(Container::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_truncated_payload() {
        let container = Container::new(header(None), vec![1, 2, 3, 4, 5, 6]);
        let bytes = container.to_bytes().unwrap();

        assert!(Container::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
