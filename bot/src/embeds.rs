//! Chat Presentation
//!
//! Embeds and paginated menus handed to the host for rendering.

use serde::Serialize;

use crate::settings::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE, SEARCH_PAGE_SIZE};
use crate::workflow::{CuratedPick, API_KEY_URL};

/// Credit line shown under every Pexels image.
const PEXELS_CREDIT: &str = "Photos provided by Pexels";

/// Rich message card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

/// Named field inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            image_url: None,
            footer: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// Reaction control on a paginated menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuControl {
    Previous,
    Close,
    Next,
}

impl MenuControl {
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Previous => "\u{2b05}\u{fe0f}",
            Self::Close => "\u{274c}",
            Self::Next => "\u{27a1}\u{fe0f}",
        }
    }
}

/// Previous, close, next.
pub const DEFAULT_CONTROLS: [MenuControl; 3] =
    [MenuControl::Previous, MenuControl::Close, MenuControl::Next];

/// Paginated sequence of embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub pages: Vec<Embed>,
    pub controls: Vec<MenuControl>,
}

impl Menu {
    #[must_use]
    pub fn new(pages: Vec<Embed>) -> Self {
        Self {
            pages,
            controls: DEFAULT_CONTROLS.to_vec(),
        }
    }
}

/// What a command sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message.
    Text(String),
    /// A single embed.
    Embed(Embed),
    /// A paginated menu.
    Menu(Menu),
    /// Acknowledge success without a message.
    Tick,
}

/// Embed for a random curated photo.
#[must_use]
pub fn curated_embed(pick: &CuratedPick, color: u32) -> Embed {
    Embed::new("A random picture has appeared", color)
        .image(pick.url.clone())
        .footer(format!("{PEXELS_CREDIT} | Randomness: {}", pick.page_size))
}

/// One menu page per search result, in result order.
#[must_use]
pub fn search_menu(term: &str, urls: Vec<String>, color: u32) -> Menu {
    let pages = urls
        .into_iter()
        .map(|url| {
            Embed::new(format!("Search results for {term}"), color)
                .image(url)
                .footer(format!(
                    "{PEXELS_CREDIT} | Results per page: {SEARCH_PAGE_SIZE}"
                ))
        })
        .collect();
    Menu::new(pages)
}

/// Setup instructions for the bot owner.
#[must_use]
pub fn setup_embed(color: u32) -> Embed {
    Embed::new("How do I set up the bot?", color)
        .field(
            format!("1. Get an API key from {API_KEY_URL}"),
            "Then store it as the `authorization` field of the shared `pexels` API token \
             (or start the bot with **PEXELS_API_KEY** set)",
            false,
        )
        .field(
            "2. Set the max GLOBAL number of images to fetch",
            format!(
                "This is the maximum number of images that will be fetched from the API. \
                 Default is {DEFAULT_PAGE_SIZE}. Do that with **/pexels-defnumber <number>**"
            ),
            false,
        )
        .field(
            "3. Set the max number of images to fetch per guild",
            format!(
                "This is the maximum number of images that will be fetched from the API per guild. \
                 Default is same as global ({MIN_PAGE_SIZE}-{MAX_PAGE_SIZE}). \
                 Do that with **/pexels-number <number>**"
            ),
            false,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_embed_footer_shows_page_size() {
        let pick = CuratedPick {
            url: "https://images.pexels.com/1.jpeg".into(),
            photo_id: 1,
            page_size: 42,
        };

        let embed = curated_embed(&pick, 0xff0000);
        assert_eq!(embed.title, "A random picture has appeared");
        assert_eq!(embed.image_url.as_deref(), Some("https://images.pexels.com/1.jpeg"));
        assert_eq!(
            embed.footer.as_deref(),
            Some("Photos provided by Pexels | Randomness: 42")
        );
    }

    #[test]
    fn test_search_menu_keeps_order() {
        let urls = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let menu = search_menu("cats", urls, 1);
        let images: Vec<_> = menu
            .pages
            .iter()
            .map(|p| p.image_url.clone().unwrap())
            .collect();

        assert_eq!(images, vec!["a", "b", "c"]);
        assert_eq!(menu.pages[0].title, "Search results for cats");
        assert_eq!(
            menu.pages[0].footer.as_deref(),
            Some("Photos provided by Pexels | Results per page: 10")
        );
        assert_eq!(menu.controls, DEFAULT_CONTROLS.to_vec());
    }

    #[test]
    fn test_setup_embed_has_three_steps() {
        let embed = setup_embed(0);
        assert_eq!(embed.fields.len(), 3);
        assert!(embed.fields.iter().all(|f| !f.inline));
        assert!(embed.fields[0].name.contains(API_KEY_URL));
    }

    #[test]
    fn test_embed_serialization_skips_empty() {
        let json = serde_json::to_value(Embed::new("t", 5)).unwrap();
        assert_eq!(json, serde_json::json!({"title": "t", "color": 5}));
    }

    #[test]
    fn test_menu_controls_serialize_snake_case() {
        let json = serde_json::to_value(Menu::new(Vec::new())).unwrap();
        assert_eq!(
            json["controls"],
            serde_json::json!(["previous", "close", "next"])
        );
    }
}
