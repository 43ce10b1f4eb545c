//! Pexels Bot
//!
//! Curated photos and image search from Pexels for Kaiku guilds, with
//! per-guild page size settings.

pub mod commands;
pub mod config;
pub mod credentials;
pub mod db;
pub mod embeds;
pub mod gateway;
pub mod pexels;
pub mod settings;
pub mod workflow;
