//! Image Fetch Workflow
//!
//! Resolves the page size for a guild, calls Pexels with the shared API key
//! and returns image URLs ready for presentation. Holds no state of its own;
//! settings and credentials live in injected stores.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::credentials::{self, CredentialStore, AUTHORIZATION_FIELD, PEXELS_SERVICE};
use crate::pexels::{PexelsClient, PexelsError};
use crate::settings::{PageSizeError, PageSizeSettings, SetPageSizeError, StoreError, SEARCH_PAGE_SIZE};

/// Where users get a Pexels API key.
pub const API_KEY_URL: &str = "https://www.pexels.com/api/";

/// Errors from workflow operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// No Pexels API key is configured.
    #[error("You need to get an API key from https://www.pexels.com/api/")]
    CredentialMissing,
    /// Page size argument rejected.
    #[error(transparent)]
    Validation(#[from] PageSizeError),
    /// Pexels request failed.
    #[error(transparent)]
    Upstream(#[from] PexelsError),
    /// The curated page held fewer photos than the drawn index.
    #[error("Curated page returned {returned} photos, index {index} is out of range")]
    CuratedIndexOutOfRange {
        /// Drawn index.
        index: usize,
        /// Number of photos Pexels returned.
        returned: usize,
    },
    /// Settings or credential store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SetPageSizeError> for WorkflowError {
    fn from(err: SetPageSizeError) -> Self {
        match err {
            SetPageSizeError::Invalid(e) => Self::Validation(e),
            SetPageSizeError::Store(e) => Self::Store(e),
        }
    }
}

impl WorkflowError {
    /// Whether the message is meant for the invoking user as-is.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::CredentialMissing | Self::Validation(_))
    }
}

/// Result of a curated fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedPick {
    /// Large image URL of the chosen photo.
    pub url: String,
    /// Pexels ID of the chosen photo.
    pub photo_id: u64,
    /// Page size the pick was drawn from.
    pub page_size: u32,
}

/// The image fetch workflow.
#[derive(Clone)]
pub struct ImageFetchWorkflow {
    settings: PageSizeSettings,
    credentials: Arc<dyn CredentialStore>,
    pexels: PexelsClient,
}

impl ImageFetchWorkflow {
    pub fn new(
        settings: PageSizeSettings,
        credentials: Arc<dyn CredentialStore>,
        pexels: PexelsClient,
    ) -> Self {
        Self {
            settings,
            credentials,
            pexels,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &PageSizeSettings {
        &self.settings
    }

    /// Effective page size for a guild.
    pub async fn resolve_page_size(&self, guild_id: Uuid) -> Result<u32, WorkflowError> {
        Ok(self.settings.resolve(guild_id).await?)
    }

    /// Whether a non-empty Pexels API key is configured.
    pub async fn has_credential(&self) -> Result<bool, WorkflowError> {
        Ok(self.token().await?.is_some())
    }

    async fn token(&self) -> Result<Option<String>, StoreError> {
        credentials::token(self.credentials.as_ref(), PEXELS_SERVICE, AUTHORIZATION_FIELD).await
    }

    async fn require_token(&self) -> Result<String, WorkflowError> {
        self.token().await?.ok_or(WorkflowError::CredentialMissing)
    }

    /// Large image URL for a photo.
    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, guild_id: Uuid, photo_id: u64) -> Result<String, WorkflowError> {
        let token = self.require_token().await?;
        let page_size = self.settings.resolve(guild_id).await?;

        let photo = self.pexels.photo(&token, photo_id, page_size).await?;
        let src = photo.src.ok_or(PexelsError::MissingSource(photo.id))?;
        Ok(src.large)
    }

    /// A random photo from the curated feed.
    pub async fn fetch_curated(&self, guild_id: Uuid) -> Result<CuratedPick, WorkflowError> {
        let mut rng = StdRng::from_entropy();
        self.fetch_curated_with(guild_id, &mut rng).await
    }

    /// Curated fetch with a caller-supplied random source.
    ///
    /// The index is drawn from `[0, page_size)`, not from the number of
    /// photos actually returned. A short page yields
    /// [`WorkflowError::CuratedIndexOutOfRange`].
    #[instrument(skip(self, rng))]
    pub async fn fetch_curated_with<R: Rng + Send>(
        &self,
        guild_id: Uuid,
        rng: &mut R,
    ) -> Result<CuratedPick, WorkflowError> {
        let token = self.require_token().await?;
        let page_size = self.settings.resolve(guild_id).await?;
        let index = rng.gen_range(0..page_size) as usize;

        let page = self.pexels.curated(&token, page_size).await?;
        let returned = page.photos.len();
        let photo_id = match page.photos.get(index) {
            Some(photo) => photo.id,
            None => {
                warn!(index, returned, page_size, "Curated page shorter than requested");
                return Err(WorkflowError::CuratedIndexOutOfRange { index, returned });
            }
        };

        let url = self.fetch_by_id(guild_id, photo_id).await?;
        info!(guild_id = %guild_id, photo_id, page_size, "Curated photo fetched");

        Ok(CuratedPick {
            url,
            photo_id,
            page_size,
        })
    }

    /// Large image URLs for up to [`SEARCH_PAGE_SIZE`] search results, in
    /// the order Pexels returned them. Any failed detail fetch fails the
    /// whole search.
    #[instrument(skip(self))]
    pub async fn fetch_search(&self, guild_id: Uuid, query: &str) -> Result<Vec<String>, WorkflowError> {
        let token = self.require_token().await?;

        let page = self.pexels.search(&token, query, SEARCH_PAGE_SIZE).await?;

        let mut urls = Vec::with_capacity(page.photos.len());
        for photo in &page.photos {
            urls.push(self.fetch_by_id(guild_id, photo.id).await?);
        }

        info!(guild_id = %guild_id, results = urls.len(), "Search completed");
        Ok(urls)
    }

    /// Set the guild's page size override.
    pub async fn set_guild_page_size(&self, guild_id: Uuid, n: Option<i64>) -> Result<u32, WorkflowError> {
        Ok(self.settings.set_guild(guild_id, n).await?)
    }

    /// Clear the guild's override so it follows the global default.
    pub async fn reset_guild_page_size(&self, guild_id: Uuid) -> Result<(), WorkflowError> {
        Ok(self.settings.reset_guild(guild_id).await?)
    }

    /// Set the global default page size.
    pub async fn set_global_page_size(&self, n: Option<i64>) -> Result<u32, WorkflowError> {
        Ok(self.settings.set_global(n).await?)
    }
}
