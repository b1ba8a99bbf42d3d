//! Built-in list sources
//!
//! Category sources, single-list presets and the hardcoded lists used when
//! nothing can be downloaded.

use crate::core::probe::types::Category;

/// Base of the community-maintained domain lists
pub const LIST_BASE_URL: &str = "https://raw.githubusercontent.com/itdoginfo/allow-domains/main";

/// Where a category's domains come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    /// Downloaded list at `LIST_BASE_URL/{path}`
    Remote(&'static str),
    /// Local allowed list, then the hardcoded one
    Static,
}

/// Display metadata and source of one category
#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub category: Category,
    pub label: &'static str,
    pub short_label: &'static str,
    pub source: CategorySource,
}

impl CategoryInfo {
    /// Download URL, `None` for the static category
    pub fn url(&self) -> Option<String> {
        match self.source {
            CategorySource::Remote(path) => Some(format!("{}/{}", LIST_BASE_URL, path)),
            CategorySource::Static => None,
        }
    }
}

pub fn category_info(category: Category) -> CategoryInfo {
    match category {
        Category::CompanyBlocked => CategoryInfo {
            category,
            label: "Services blocked by the company (sanctions, regional restrictions)",
            short_label: "Company-blocked",
            source: CategorySource::Remote("Services/google_ai.lst"),
        },
        Category::BlockedByRussia => CategoryInfo {
            category,
            label: "Blocked by the regional regulator",
            short_label: "Regulator-blocked",
            source: CategorySource::Remote("Russia/inside-raw.lst"),
        },
        Category::RussianSpecific => CategoryInfo {
            category,
            label: "Reachable only from inside the region (government services etc.)",
            short_label: "Region-only",
            source: CategorySource::Remote("Russia/outside-raw.lst"),
        },
        Category::Allowed => CategoryInfo {
            category,
            label: "Usually reachable",
            short_label: "Reachable",
            source: CategorySource::Static,
        },
    }
}

/// Single-list source selectable by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub category: Option<Category>,
}

impl Preset {
    pub fn url(&self) -> String {
        format!("{}/{}", LIST_BASE_URL, self.path)
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        id: "russia-inside",
        label: "Russia inside RAW",
        path: "Russia/inside-raw.lst",
        category: Some(Category::BlockedByRussia),
    },
    Preset {
        id: "russia-outside",
        label: "Russia outside RAW",
        path: "Russia/outside-raw.lst",
        category: Some(Category::RussianSpecific),
    },
    Preset {
        id: "google-ai",
        label: "Services: Google AI (company-blocked)",
        path: "Services/google_ai.lst",
        category: Some(Category::CompanyBlocked),
    },
    Preset {
        id: "youtube",
        label: "Services: YouTube",
        path: "Services/youtube.lst",
        category: None,
    },
    Preset {
        id: "discord",
        label: "Services: Discord",
        path: "Services/discord.lst",
        category: None,
    },
    Preset {
        id: "meta",
        label: "Services: Meta",
        path: "Services/meta.lst",
        category: None,
    },
    Preset {
        id: "telegram",
        label: "Services: Telegram",
        path: "Services/telegram.lst",
        category: None,
    },
    Preset {
        id: "tiktok",
        label: "Services: Tik-Tok",
        path: "Services/tiktok.lst",
        category: None,
    },
    Preset {
        id: "twitter",
        label: "Services: Twitter",
        path: "Services/twitter.lst",
        category: None,
    },
    Preset {
        id: "hdrezka",
        label: "Services: HDRezka",
        path: "Services/hdrezka.lst",
        category: None,
    },
];

pub const DEFAULT_PRESET_ID: &str = "russia-inside";

pub fn find_preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// Used when the allowed list is missing or empty
pub fn hardcoded_allowed_domains() -> Vec<String> {
    [
        "wikipedia.org",
        "google.com",
        "github.com",
        "cloudflare.com",
        "microsoft.com",
        "apple.com",
        "amazon.com",
        "stackoverflow.com",
        "reddit.com",
        "medium.com",
        "bbc.com",
        "reuters.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Last-resort list when no source can be read
pub fn hardcoded_fallback_domains() -> Vec<String> {
    [
        "wikipedia.org",
        "google.com",
        "youtube.com",
        "github.com",
        "raw.githubusercontent.com",
        "cloudflare.com",
        "discord.com",
        "telegram.org",
        "twitter.com",
        "facebook.com",
        "instagram.com",
        "vk.com",
        "ya.ru",
        "yandex.ru",
        "mail.ru",
        "ok.ru",
        "tiktok.com",
        "twitch.tv",
        "reddit.com",
        "amazon.com",
        "microsoft.com",
        "apple.com",
        "netflix.com",
        "spotify.com",
        "zoom.us",
        "slack.com",
        "medium.com",
        "stackoverflow.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
