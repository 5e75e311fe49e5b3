use std::env;
use std::sync::Arc;

use literacy_core::model::{RecordingId, RecordingLink};
use storage::repository::{RecordingRepository, StorageError};
use tracing::info;
use url::Url;

use crate::error::RecordingServiceError;

const DEFAULT_CLOUD_NAME: &str = "dx8v9vuxo";
const DEFAULT_DELIVERY_BASE: &str = "https://res.cloudinary.com";

#[derive(Clone, Debug)]
pub struct RecordingConfig {
    pub cloud_name: String,
    pub delivery_base: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            cloud_name: DEFAULT_CLOUD_NAME.to_string(),
            delivery_base: DEFAULT_DELIVERY_BASE.to_string(),
        }
    }
}

impl RecordingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLOUD_NAME.into());
        Self {
            cloud_name,
            ..Self::default()
        }
    }
}

/// Locates hosted student and sample recordings.
#[derive(Clone)]
pub struct RecordingService {
    config: RecordingConfig,
    recordings: Arc<dyn RecordingRepository>,
}

impl RecordingService {
    #[must_use]
    pub fn new(config: RecordingConfig, recordings: Arc<dyn RecordingRepository>) -> Self {
        Self { config, recordings }
    }

    /// Playback URL for a recording, transcoded to mp3 by the host.
    ///
    /// # Errors
    ///
    /// Returns `RecordingServiceError::Id` for an empty or malformed id and
    /// `HostUrl` if the configured host does not form a valid URL.
    pub fn playback_url(&self, raw_id: &str) -> Result<Url, RecordingServiceError> {
        let id = RecordingId::parse(raw_id)?;
        let url = Url::parse(&format!(
            "{}/{}/video/upload/{}.mp3",
            self.config.delivery_base.trim_end_matches('/'),
            self.config.cloud_name,
            id.as_str()
        ))?;
        Ok(url)
    }

    /// Remembers where a recording was uploaded.
    ///
    /// # Errors
    ///
    /// Returns `RecordingServiceError::Id` or `Recording` for invalid input and
    /// `Storage` on write failures.
    pub async fn save_link(
        &self,
        raw_id: &str,
        url: &str,
    ) -> Result<RecordingLink, RecordingServiceError> {
        let link = RecordingLink::new(RecordingId::parse(raw_id)?, url)?;
        self.recordings.save_link(&link).await?;
        Ok(link)
    }

    /// Uploaded location of a recording, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `RecordingServiceError::Id` for a malformed id and `Storage` on
    /// read failures.
    pub async fn link(&self, raw_id: &str) -> Result<Option<RecordingLink>, RecordingServiceError> {
        let id = RecordingId::parse(raw_id)?;
        Ok(self.recordings.get_link(&id).await?)
    }

    /// Removes a saved recording link.
    ///
    /// # Errors
    ///
    /// Returns `RecordingServiceError::Id` for a malformed id, `NotFound` if
    /// nothing was saved under it, and `Storage` on write failures.
    pub async fn delete_link(&self, raw_id: &str) -> Result<(), RecordingServiceError> {
        let id = RecordingId::parse(raw_id)?;
        self.recordings.delete_link(&id).await.map_err(|e| match e {
            StorageError::NotFound => RecordingServiceError::NotFound,
            other => RecordingServiceError::Storage(other),
        })?;
        info!(recording = %id, "recording link deleted");
        Ok(())
    }
}
