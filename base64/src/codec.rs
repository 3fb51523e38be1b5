//! Capability-tagged codec descriptors.

use std::fmt;

use crate::error::Error;
use crate::{avx2, decoded_len, encoded_len, neon};

/// Signature shared by every kernel entry point.
pub type KernelFn = fn(&[u8], &mut [u8]) -> Result<usize, Error>;

/// The CPU feature a codec needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Runs everywhere.
    None,
    /// x86_64 AVX2.
    Avx2,
    /// aarch64 Advanced SIMD.
    Neon,
}

impl Feature {
    /// Returns `true` if this build targets the feature's architecture and
    /// the running CPU has it.
    pub fn is_detected(self) -> bool {
        match self {
            Feature::None => true,
            Feature::Avx2 => avx2::is_available(),
            Feature::Neon => neon::is_available(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::None => write!(f, "none"),
            Feature::Avx2 => write!(f, "avx2"),
            Feature::Neon => write!(f, "neon"),
        }
    }
}

/// A named encode/decode pair and the feature it requires.
///
/// The entry points of a codec that cannot run here return
/// [`Error::NotApplicable`] without touching the buffers.
#[derive(Clone, Copy)]
pub struct Codec {
    name: &'static str,
    feature: Feature,
    encode: KernelFn,
    decode: KernelFn,
}

impl Codec {
    const fn new(name: &'static str, feature: Feature, encode: KernelFn, decode: KernelFn) -> Self {
        Codec {
            name,
            feature,
            encode,
            decode,
        }
    }

    /// Short identifier, e.g. `"neon64"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    /// Returns `true` if this codec can run on the current CPU.
    pub fn is_available(&self) -> bool {
        self.feature.is_detected()
    }

    /// Encodes `src` into `dst`, returning the number of symbols written.
    pub fn encode(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
        check_capacity(encoded_len(src.len()), dst.len())?;
        (self.encode)(src, dst)
    }

    /// Decodes `src` into `dst`, returning the number of bytes written.
    ///
    /// On error no decoded bytes remain in `dst`.
    pub fn decode(&self, src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
        check_capacity(max_decoded(src), dst.len())?;
        (self.decode)(src, dst)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("name", &self.name)
            .field("feature", &self.feature)
            .finish()
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Codec {}

fn check_capacity(needed: usize, available: usize) -> Result<(), Error> {
    if available < needed {
        return Err(Error::OutputTooSmall { needed, available });
    }
    Ok(())
}

/// Exact decoded size for well-padded input, so callers can size buffers
/// exactly. Malformed input falls through to the kernel, which rejects it.
fn max_decoded(src: &[u8]) -> usize {
    let padding = src.iter().rev().take(2).take_while(|&&b| b == b'=').count();
    decoded_len(src.len()).saturating_sub(padding)
}

fn scalar_encode(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    Ok(crate::scalar::encode(src, dst))
}

const SCALAR: Codec = Codec::new("scalar", Feature::None, scalar_encode, crate::scalar::decode);

static CODECS: [Codec; 4] = [
    Codec::new(avx2::NAME, Feature::Avx2, avx2::encode, avx2::decode),
    Codec::new(neon::NEON64, Feature::Neon, neon::encode64, neon::decode64),
    Codec::new(neon::NEON32, Feature::Neon, neon::encode32, neon::decode32),
    SCALAR,
];

/// All codecs in preference order, fastest first. The last one is always
/// available.
pub fn codecs() -> &'static [Codec] {
    &CODECS
}

/// Looks up a codec by name, ignoring ASCII case.
pub fn codec(name: &str) -> Option<&'static Codec> {
    CODECS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// The scalar codec, available on every target.
pub fn scalar() -> &'static Codec {
    &CODECS[CODECS.len() - 1]
}
