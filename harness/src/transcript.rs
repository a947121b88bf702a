//! Match transcript: the artifact a driver run produces.
//!
//! The transcript records what was played, not how long the engine took,
//! so its bytes depend only on the sequence of moves. Serialization uses
//! `serde_json` with field order fixed by declaration order, and the
//! transcript is addressed by a domain-separated SHA-256 digest.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::driver::DriverError;

/// Domain prefix for transcript digests.
pub const DOMAIN_MATCH_TRANSCRIPT: &[u8] = b"GREEDY::MATCH_TRANSCRIPT::V1\0";

/// Schema identifier written into every transcript.
pub const MATCH_TRANSCRIPT_SCHEMA: &str = "match_transcript.v1";

/// Where a ply's move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSourceV1 {
    /// The best result the search produced.
    Search,
    /// The search produced nothing acceptable; the first legal move was
    /// played instead.
    Fallback,
}

/// One decided move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyRecordV1 {
    pub ply: u32,
    pub role: String,
    pub finding: String,
    /// Rank the search attached to the move; absent for fallbacks.
    pub rank: Option<i64>,
    pub source: MoveSourceV1,
}

/// How the match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchOutcomeV1 {
    /// The final model is terminal for `role`.
    Terminal { role: String },
    /// `role` was to move with no legal finding and no terminal state.
    NoMoves { role: String },
    /// The driver's ply limit was reached.
    PlyLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTranscriptV1 {
    pub schema_version: String,
    pub plies: Vec<PlyRecordV1>,
    pub outcome: MatchOutcomeV1,
}

impl MatchTranscriptV1 {
    #[must_use]
    pub fn new(plies: Vec<PlyRecordV1>, outcome: MatchOutcomeV1) -> Self {
        Self {
            schema_version: MATCH_TRANSCRIPT_SCHEMA.to_string(),
            plies,
            outcome,
        }
    }

    /// Compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Transcript`] if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, DriverError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// `sha256:<hex>` over the domain prefix followed by the JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Transcript`] if serialization fails.
    pub fn digest(&self) -> Result<String, DriverError> {
        let bytes = self.to_json_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_MATCH_TRANSCRIPT);
        hasher.update(&bytes);
        Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
    }

    /// Write the JSON bytes to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Transcript`] if serialization fails and
    /// [`DriverError::Io`] if the file cannot be written.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DriverError> {
        let path = path.as_ref();
        let bytes = self.to_json_bytes()?;
        std::fs::write(path, bytes).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a transcript written by [`MatchTranscriptV1::write_json`].
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Io`] if the file cannot be read and
    /// [`DriverError::Transcript`] if it is not a valid transcript.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DriverError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
