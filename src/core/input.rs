//! Secret data inputs.
//!
//! A command-line token names where secret bytes come from. The first
//! character decides:
//!
//! - `@path` reads the whole file,
//! - `-` reads a single line from stdin,
//! - `\rest` is the literal `rest` (escape for values starting with `@` or `-`),
//! - anything else is taken literally.
//!
//! Callers trim the token before handing it over.

use std::io::{BufRead, Read};
use std::path::Path;

use zeroize::Zeroizing;

use crate::error::InputError;

/// Where secret bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource<'a> {
    File(&'a Path),
    Stdin,
    Literal(&'a str),
}

impl<'a> DataSource<'a> {
    /// Classify a token.
    pub fn parse(token: &'a str) -> Self {
        if let Some(path) = token.strip_prefix('@') {
            Self::File(Path::new(path))
        } else if token.starts_with('-') {
            Self::Stdin
        } else if let Some(rest) = token.strip_prefix('\\') {
            Self::Literal(rest)
        } else {
            Self::Literal(token)
        }
    }

    /// Read the bytes this source names.
    ///
    /// Stdin sources consume up to and including the first newline, never
    /// more.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the file or stdin cannot be read.
    pub fn read<R: BufRead>(&self, stdin: &mut R) -> Result<Zeroizing<Vec<u8>>, InputError> {
        match self {
            Self::File(path) => {
                let mut buf = Zeroizing::new(Vec::new());
                std::fs::File::open(path)
                    .and_then(|mut f| f.read_to_end(&mut buf))
                    .map_err(|source| InputError::ReadFile {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Ok(buf)
            }
            Self::Stdin => {
                let mut buf = Zeroizing::new(Vec::new());
                stdin
                    .read_until(b'\n', &mut buf)
                    .map_err(InputError::ReadStdin)?;
                Ok(buf)
            }
            Self::Literal(s) => Ok(Zeroizing::new(s.as_bytes().to_vec())),
        }
    }
}

/// Resolve a token into secret bytes, reading stdin from `stdin`.
///
/// # Errors
///
/// Returns `InputError` if the named file or stream cannot be read.
pub fn read_data<R: BufRead>(token: &str, stdin: &mut R) -> Result<Zeroizing<Vec<u8>>, InputError> {
    DataSource::parse(token).read(stdin)
}

/// Resolve a token into secret bytes using the process's stdin.
///
/// # Errors
///
/// Returns `InputError` if the named file or stdin cannot be read.
pub fn read_data_stdin(token: &str) -> Result<Zeroizing<Vec<u8>>, InputError> {
    let stdin = std::io::stdin();
    let mut lock = stdin.lock();
    read_data(token, &mut lock)
}
