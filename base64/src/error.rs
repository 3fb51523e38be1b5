use thiserror::Error;

/// Error type for base64 codec operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The codec cannot run on this build or CPU. Callers should try another codec.
    #[error("codec `{0}` is not applicable on this target")]
    NotApplicable(&'static str),
    /// Decode input length is not a multiple of 4.
    #[error("invalid input length: {0} is not a multiple of 4")]
    InvalidLength(usize),
    /// A byte outside the base64 alphabet.
    #[error("invalid character {byte:#04x} at offset {offset}")]
    InvalidCharacter { byte: u8, offset: usize },
    /// A `=` outside the last two positions, or followed by a non-padding symbol.
    #[error("invalid padding at offset {offset}")]
    InvalidPadding { offset: usize },
    /// The destination slice cannot hold the output.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputTooSmall { needed: usize, available: usize },
}

impl Error {
    /// Returns `true` for errors caused by malformed decode input.
    pub fn is_invalid_encoding(&self) -> bool {
        matches!(
            self,
            Error::InvalidLength(_) | Error::InvalidCharacter { .. } | Error::InvalidPadding { .. }
        )
    }

    /// Shifts a reported offset by `base`, for errors found in a sub-slice.
    pub(crate) fn offset_by(self, base: usize) -> Error {
        match self {
            Error::InvalidCharacter { byte, offset } => Error::InvalidCharacter {
                byte,
                offset: offset + base,
            },
            Error::InvalidPadding { offset } => Error::InvalidPadding {
                offset: offset + base,
            },
            other => other,
        }
    }
}
