//! Pexels API Response Types
//!
//! Only the fields the bot reads are modelled; everything else is ignored.

use serde::Deserialize;

/// A single photo record.
#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    /// Pexels photo ID.
    pub id: u64,
    /// Image URLs by size. List endpoints include it too, but the bot
    /// re-fetches each photo by ID before using it.
    #[serde(default)]
    pub src: Option<PhotoSrc>,
}

/// Image URLs for a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSrc {
    pub large: String,
}

/// A page of photos from `/v1/curated` or `/v1/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoPage {
    pub photos: Vec<Photo>,
}
