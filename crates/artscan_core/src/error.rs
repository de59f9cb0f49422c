use std::error::Error;
use std::fmt;

/// A raw OCR field could not be turned into a typed stat value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownStatName(String),
    MagnitudeKindMismatch { name: String, value: String },
    BadMagnitude(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatName(name) => write!(f, "unknown stat name {name:?}"),
            Self::MagnitudeKindMismatch { name, value } => {
                write!(f, "magnitude {value:?} does not fit stat {name:?}")
            }
            Self::BadMagnitude(value) => write!(f, "unreadable stat magnitude {value:?}"),
        }
    }
}

impl Error for ParseError {}

/// The record is internally inconsistent; no artifact is created.
/// Carries the offending field so the caller can log it or route the
/// source image to manual review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    BadLevel(String),
    BadMainStat(String),
    BadSubStats(String),
    UnknownPieceName(String),
    MalformedRecord(String),
    Parse(ParseError),
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLevel(detail) => write!(f, "bad level: {detail}"),
            Self::BadMainStat(detail) => write!(f, "bad main stat: {detail}"),
            Self::BadSubStats(detail) => write!(f, "bad sub stats: {detail}"),
            Self::UnknownPieceName(name) => write!(f, "unknown artifact piece name {name:?}"),
            Self::MalformedRecord(detail) => write!(f, "malformed record: {detail}"),
            Self::Parse(e) => write!(f, "parse failure: {e}"),
        }
    }
}

impl Error for ConstructionError {}

impl From<ParseError> for ConstructionError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    ReferenceData,
    StoreIo,
    Parse,
}

/// Infrastructure failure: reference data missing at startup or the
/// durable store write failed. Per-record rejections are
/// [`ConstructionError`], never this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}

/// Either failure mode of [`crate::store::ArtifactStore::add`]: the
/// candidate record was rejected, or it was accepted in memory but the
/// durable write failed (and the insertion was rolled back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddError {
    Construction(ConstructionError),
    Store(CoreError),
}

impl fmt::Display for AddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Construction(e) => e.fmt(f),
            Self::Store(e) => e.fmt(f),
        }
    }
}

impl Error for AddError {}

impl From<ConstructionError> for AddError {
    fn from(e: ConstructionError) -> Self {
        Self::Construction(e)
    }
}

impl From<CoreError> for AddError {
    fn from(e: CoreError) -> Self {
        Self::Store(e)
    }
}
