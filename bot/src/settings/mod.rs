//! Page Size Settings
//!
//! The global default page size and per-guild overrides, backed by a
//! [`ConfigStore`].

mod store;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

pub use store::{ConfigKey, ConfigStore, MemoryConfigStore, RedisConfigStore, StoreError};

/// Smallest page size a guild owner or bot owner may configure.
pub const MIN_PAGE_SIZE: u32 = 15;

/// Largest page size a guild owner or bot owner may configure.
pub const MAX_PAGE_SIZE: u32 = 80;

/// Global default used until the bot owner sets one.
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Search requests always ask for this many results, regardless of settings.
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Rejected page size argument.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSizeError {
    /// No number (or zero) was given.
    #[error("Enter a number.")]
    Missing,
    /// Below [`MIN_PAGE_SIZE`].
    #[error("The minimum number is 15.")]
    BelowMinimum,
    /// Above [`MAX_PAGE_SIZE`].
    #[error("The maximum number is 80.")]
    AboveMaximum,
}

/// Validate a page size argument.
///
/// Zero counts as missing, like an omitted argument.
pub fn validate_page_size(value: Option<i64>) -> Result<u32, PageSizeError> {
    let value = match value {
        None | Some(0) => return Err(PageSizeError::Missing),
        Some(v) => v,
    };
    if value < i64::from(MIN_PAGE_SIZE) {
        return Err(PageSizeError::BelowMinimum);
    }
    if value > i64::from(MAX_PAGE_SIZE) {
        return Err(PageSizeError::AboveMaximum);
    }
    Ok(value as u32)
}

/// Errors from writing a page size.
#[derive(Error, Debug)]
pub enum SetPageSizeError {
    /// The argument failed validation; nothing was written.
    #[error(transparent)]
    Invalid(#[from] PageSizeError),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration service for page sizes.
#[derive(Clone)]
pub struct PageSizeSettings {
    store: Arc<dyn ConfigStore>,
}

impl PageSizeSettings {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Current global default. Stored values are trusted as written.
    pub async fn global_default(&self) -> Result<u32, StoreError> {
        let stored = self.store.get(ConfigKey::GlobalPageSize).await?;
        Ok(stored
            .and_then(positive_u32)
            .unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// The guild's override, if one is set.
    pub async fn guild_override(&self, guild_id: Uuid) -> Result<Option<u32>, StoreError> {
        let stored = self.store.get(ConfigKey::GuildPageSize(guild_id)).await?;
        Ok(stored.and_then(positive_u32))
    }

    /// Effective page size for a guild: its override, else the global default.
    #[instrument(skip(self))]
    pub async fn resolve(&self, guild_id: Uuid) -> Result<u32, StoreError> {
        if let Some(size) = self.guild_override(guild_id).await? {
            return Ok(size);
        }
        self.global_default().await
    }

    /// Set a guild override after validating it.
    #[instrument(skip(self))]
    pub async fn set_guild(&self, guild_id: Uuid, value: Option<i64>) -> Result<u32, SetPageSizeError> {
        let size = validate_page_size(value)?;
        self.store
            .set(ConfigKey::GuildPageSize(guild_id), i64::from(size))
            .await?;
        debug!(guild_id = %guild_id, size, "Guild page size set");
        Ok(size)
    }

    /// Clear a guild override.
    #[instrument(skip(self))]
    pub async fn reset_guild(&self, guild_id: Uuid) -> Result<(), StoreError> {
        self.store.remove(ConfigKey::GuildPageSize(guild_id)).await?;
        debug!(guild_id = %guild_id, "Guild page size reset");
        Ok(())
    }

    /// Set the global default after validating it.
    #[instrument(skip(self))]
    pub async fn set_global(&self, value: Option<i64>) -> Result<u32, SetPageSizeError> {
        let size = validate_page_size(value)?;
        self.store
            .set(ConfigKey::GlobalPageSize, i64::from(size))
            .await?;
        debug!(size, "Global page size set");
        Ok(size)
    }
}

fn positive_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PageSizeSettings {
        PageSizeSettings::new(Arc::new(MemoryConfigStore::new()))
    }

    #[test]
    fn test_validate_bounds() {
        assert_eq!(validate_page_size(Some(15)), Ok(15));
        assert_eq!(validate_page_size(Some(80)), Ok(80));
        assert_eq!(validate_page_size(Some(14)), Err(PageSizeError::BelowMinimum));
        assert_eq!(validate_page_size(Some(-3)), Err(PageSizeError::BelowMinimum));
        assert_eq!(validate_page_size(Some(81)), Err(PageSizeError::AboveMaximum));
        assert_eq!(validate_page_size(Some(0)), Err(PageSizeError::Missing));
        assert_eq!(validate_page_size(None), Err(PageSizeError::Missing));
    }

    #[test]
    fn test_error_messages_name_the_bound() {
        assert_eq!(PageSizeError::Missing.to_string(), "Enter a number.");
        assert_eq!(
            PageSizeError::BelowMinimum.to_string(),
            "The minimum number is 15."
        );
        assert_eq!(
            PageSizeError::AboveMaximum.to_string(),
            "The maximum number is 80."
        );
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_global_default() {
        let settings = settings();
        let guild_id = Uuid::new_v4();

        assert_eq!(settings.resolve(guild_id).await.unwrap(), DEFAULT_PAGE_SIZE);

        settings.set_global(Some(40)).await.unwrap();
        assert_eq!(settings.resolve(guild_id).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_every_valid_size_round_trips() {
        let settings = settings();
        let guild_id = Uuid::new_v4();

        for n in MIN_PAGE_SIZE..=MAX_PAGE_SIZE {
            settings.set_guild(guild_id, Some(i64::from(n))).await.unwrap();
            assert_eq!(settings.resolve(guild_id).await.unwrap(), n);
        }
    }

    #[tokio::test]
    async fn test_rejected_values_leave_state_unchanged() {
        let settings = settings();
        let guild_id = Uuid::new_v4();
        settings.set_guild(guild_id, Some(30)).await.unwrap();
        settings.set_global(Some(50)).await.unwrap();

        for bad in [-1, 0, 1, 14, 81, 1000] {
            assert!(settings.set_guild(guild_id, Some(bad)).await.is_err());
            assert!(settings.set_global(Some(bad)).await.is_err());
        }

        assert_eq!(settings.resolve(guild_id).await.unwrap(), 30);
        assert_eq!(settings.global_default().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_reset_restores_global_default() {
        let settings = settings();
        let guild_id = Uuid::new_v4();

        settings.set_guild(guild_id, Some(60)).await.unwrap();
        assert_eq!(settings.resolve(guild_id).await.unwrap(), 60);

        settings.reset_guild(guild_id).await.unwrap();
        assert_eq!(settings.guild_override(guild_id).await.unwrap(), None);
        assert_eq!(settings.resolve(guild_id).await.unwrap(), DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_rejected_guild_size_keeps_default() {
        let settings = settings();
        let guild_id = Uuid::new_v4();

        let err = settings.set_guild(guild_id, Some(10)).await.unwrap_err();
        assert!(matches!(
            err,
            SetPageSizeError::Invalid(PageSizeError::BelowMinimum)
        ));
        assert_eq!(settings.resolve(guild_id).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_seeded_global_default_is_not_bounds_checked() {
        let store = Arc::new(MemoryConfigStore::new());
        store.set(ConfigKey::GlobalPageSize, 5).await.unwrap();
        let settings = PageSizeSettings::new(store);

        assert_eq!(settings.resolve(Uuid::new_v4()).await.unwrap(), 5);
    }
}
