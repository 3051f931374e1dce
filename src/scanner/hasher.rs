//! Streaming file hashing.
//!
//! # Overview
//!
//! Files are streamed through a boxed [`DynDigest`] in fixed-size chunks,
//! so memory use does not depend on file size. The digest is rendered as
//! lowercase hex, which is also the key of the walker's dedup index.
//!
//! # Example
//!
//! ```no_run
//! use uniqwalk::scanner::hasher::{hash_file, HashAlgorithm};
//! use std::path::Path;
//!
//! let hex = hash_file(Path::new("Cargo.toml"), HashAlgorithm::Sha256.hasher()).unwrap();
//! assert_eq!(hex.len(), 64);
//! ```

use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::digest::{DynDigest, InvalidBufferSize};
use sha2::{Sha256, Sha512};

use crate::error::WalkError;

/// Read buffer size used while streaming a file through the digest.
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Digest algorithms selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 (default)
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
    /// BLAKE3 with 256-bit output
    Blake3,
}

impl HashAlgorithm {
    /// Create a fresh digest accumulator for this algorithm.
    #[must_use]
    pub fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            Self::Sha256 => Box::new(Sha256::default()),
            Self::Sha512 => Box::new(Sha512::default()),
            Self::Blake3 => Box::new(Blake3Digest::default()),
        }
    }

    #[cfg(test)]
    fn hex_len(self) -> usize {
        match self {
            Self::Sha256 | Self::Blake3 => 64,
            Self::Sha512 => 128,
        }
    }
}

/// BLAKE3 behind the [`DynDigest`] interface, using blake3's own API.
#[derive(Clone, Default)]
pub struct Blake3Digest(blake3::Hasher);

impl Blake3Digest {
    fn write_output(&self, out: &mut [u8]) -> Result<(), InvalidBufferSize> {
        if out.len() != blake3::OUT_LEN {
            return Err(InvalidBufferSize);
        }
        out.copy_from_slice(self.0.finalize().as_bytes());
        Ok(())
    }
}

impl DynDigest for Blake3Digest {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize_into(self, buf: &mut [u8]) -> Result<(), InvalidBufferSize> {
        self.write_output(buf)
    }

    fn finalize_into_reset(&mut self, out: &mut [u8]) -> Result<(), InvalidBufferSize> {
        self.write_output(out)?;
        self.0.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.0.reset();
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }

    fn box_clone(&self) -> Box<dyn DynDigest> {
        Box::new(self.clone())
    }
}

/// Hash the full contents of a file.
///
/// The file handle is dropped before returning, on success and on error.
///
/// # Errors
///
/// Returns [`WalkError::Io`] naming `path` if the file cannot be opened or read.
pub fn hash_file(path: &Path, mut hasher: Box<dyn DynDigest>) -> Result<String, WalkError> {
    let io_err = |source| WalkError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_err(e)),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hash_to_hex(&hasher.finalize()))
}

/// Render digest bytes as a lowercase hex string.
#[must_use]
pub fn hash_to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(hex, "{:02x}", b);
    }
    hex
}
