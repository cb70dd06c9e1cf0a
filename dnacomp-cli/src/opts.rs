use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use atty::Stream;
use log::{debug, info};
use tempfile::NamedTempFile;

pub fn input_stream(path: &str) -> Result<InputStream, String> {
    let result = InputStream {
        path: PathBuf::from(path),
    };

    Ok(result)
}

#[derive(Debug, Clone)]
pub struct InputStream {
    path: PathBuf,
}

impl Display for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self {
            path: PathBuf::from("-"),
        }
    }
}

impl InputStream {
    pub fn as_reader(&self) -> anyhow::Result<InputReader> {
        InputReader::from_path(&self.path)
    }
}

#[derive(Debug)]
pub enum InputReader {
    Stdin(io::Stdin),
    File { file: File, path: PathBuf },
}

impl InputReader {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let is_stdin = path.to_string_lossy() == "-";

        let val = if is_stdin {
            Self::Stdin(io::stdin())
        } else {
            let file = File::open(path)
                .with_context(|| format!("Could not open {}", path.display()))?;

            Self::File {
                file,
                path: path.to_owned(),
            }
        };
        Ok(val)
    }

    pub fn length(&self) -> anyhow::Result<Option<u64>> {
        let val = match self {
            InputReader::Stdin(_) => None,
            InputReader::File { file, .. } => Some(file.metadata()?.len()),
        };
        Ok(val)
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            InputReader::Stdin(_) => None,
            InputReader::File { path, .. } => Some(path),
        }
    }

    #[must_use]
    pub fn into_read(self) -> Box<dyn Read + Send> {
        match self {
            InputReader::Stdin(stdin) => Box::new(stdin),
            InputReader::File { file, .. } => Box::new(file),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Binary,
}

/// Standard output, or a temporary file next to the destination that only
/// replaces it once [`OutputWriter::commit`] is called.
#[derive(Debug)]
pub enum OutputWriter {
    Stdout(io::Stdout),
    File { file: NamedTempFile, path: PathBuf },
}

impl OutputWriter {
    pub fn from_path_and_input(
        output: &Option<PathBuf>,
        input: &InputReader,
        new_extension: &str,
        mode: OutputMode,
    ) -> anyhow::Result<Self> {
        if let Some(path) = output {
            Self::from_path(path, mode)
        } else {
            let path = input
                .file_path()
                .map(|path| path.with_extension(new_extension))
                .unwrap_or_else(|| PathBuf::from("-"));

            Self::from_path(&path, mode)
        }
    }

    fn from_path(path: &Path, mode: OutputMode) -> anyhow::Result<Self> {
        info!("Output file: {}", path.display());

        let is_stdout = path.to_string_lossy() == "-";

        if mode == OutputMode::Binary && is_stdout && atty::is(Stream::Stdout) {
            bail!("Cannot output binary file to stdout when running in terminal; please use -o option instead or pipe the standard output");
        }

        let writer = if is_stdout {
            Self::Stdout(io::stdout())
        } else {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let file = tempfile::Builder::new()
                .prefix(".dnacomp-")
                .suffix(".tmp")
                .tempfile_in(dir)
                .with_context(|| format!("Could not create a file in {}", dir.display()))?;
            debug!("Writing to temporary file {}", file.path().display());

            Self::File {
                file,
                path: path.to_owned(),
            }
        };

        Ok(writer)
    }

    /// Flushes the output and moves the temporary file into place.
    ///
    /// Dropping the writer without committing removes the temporary file.
    pub fn commit(self) -> anyhow::Result<()> {
        match self {
            OutputWriter::Stdout(mut stdout) => stdout.flush()?,
            OutputWriter::File { mut file, path } => {
                file.flush()?;
                file.as_file().sync_all()?;
                file.persist(&path)
                    .with_context(|| format!("Could not write {}", path.display()))?;
            }
        }

        Ok(())
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputWriter::Stdout(stdout) => stdout.write(buf),
            OutputWriter::File { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputWriter::Stdout(stdout) => stdout.flush(),
            OutputWriter::File { file, .. } => file.flush(),
        }
    }
}
