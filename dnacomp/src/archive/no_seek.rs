use std::fmt::Debug;
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom, Write};

/// Wrapper over a [`std::io::Read`] or [`std::io::Write`] object that provides
/// a dummy [`std::io::Seek`] implementation.
///
/// `binrw` requires [`Seek`], but only ever asks for the current position
/// when reading and writing archives front to back. This lets the archive
/// code work on pipes and standard streams.
#[derive(Debug)]
pub struct NoSeek<T> {
    inner: T,
    position: u64,
}

impl<T> NoSeek<T> {
    /// Constructs a new [`NoSeek<T>`] object.
    ///
    /// # Examples
    /// ```
    /// use std::io::{Seek, SeekFrom};
    ///
    /// use dnacomp::archive::no_seek::NoSeek;
    ///
    /// let data: Vec<u8> = Vec::new();
    /// let mut reader = NoSeek::new(data.as_slice());
    ///
    /// assert!(reader.seek(SeekFrom::Current(0)).is_ok());
    /// assert!(reader.seek(SeekFrom::Start(1)).is_err());
    /// assert!(reader.seek(SeekFrom::End(0)).is_err());
    /// ```
    pub fn new(inner: T) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes read or written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn seek_error() -> Error {
        Error::new(ErrorKind::Unsupported, "Non-noop seek on a NoSeek object")
    }
}

impl<T> Seek for NoSeek<T> {
    #[inline]
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match pos {
            SeekFrom::Start(i) if i == self.position => Ok(self.position),
            SeekFrom::Current(0) => Ok(self.position),
            _ => Err(Self::seek_error()),
        }
    }
}

impl<R: Read> Read for NoSeek<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.inner.read(buf)?;
        self.position += size as u64;
        Ok(size)
    }
}

impl<W: Write> Write for NoSeek<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.position += size as u64;
        Ok(size)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek, SeekFrom, Write};

    use crate::archive::no_seek::NoSeek;

    #[test]
    fn test_tracks_position() {
        let mut writer = NoSeek::new(Vec::new());
        writer.write_all(b"DNZA").unwrap();
        assert_eq!(writer.position(), 4);
        assert_eq!(writer.stream_position().unwrap(), 4);
        assert!(writer.seek(SeekFrom::Start(4)).is_ok());
        assert!(writer.seek(SeekFrom::Start(0)).is_err());

        let data = writer.into_inner();
        let mut reader = NoSeek::new(data.as_slice());
        let mut buf = [0; 3];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(reader.position(), 3);
        assert!(reader.seek(SeekFrom::Current(1)).is_err());
    }
}
