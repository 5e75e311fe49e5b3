use thiserror::Error;
use url::Url;

use crate::model::ids::RecordingId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordingError {
    #[error("invalid recording URL")]
    InvalidUrl,

    #[error("recording URL must use https")]
    InsecureUrl,
}

/// Where a hosted recording can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingLink {
    recording_id: RecordingId,
    url: Url,
}

impl RecordingLink {
    /// Validates the hosted URL for a recording.
    ///
    /// # Errors
    ///
    /// Returns `RecordingError::InvalidUrl` if the URL does not parse and
    /// `RecordingError::InsecureUrl` if it is not served over https.
    pub fn new(recording_id: RecordingId, url: &str) -> Result<Self, RecordingError> {
        let url = Url::parse(url.trim()).map_err(|_| RecordingError::InvalidUrl)?;
        if url.scheme() != "https" {
            return Err(RecordingError::InsecureUrl);
        }
        Ok(Self { recording_id, url })
    }

    #[must_use]
    pub fn recording_id(&self) -> &RecordingId {
        &self.recording_id
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}
