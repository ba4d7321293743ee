//! Presentation: snapshots rendered as Discord-style embeds.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::change::Snapshot;
use crate::model::{Category, InventorySnapshot, StockItem, WeatherSnapshot};

/// Accent color of stock embeds.
pub const STOCK_COLOR: u32 = 0x2e_cc_71;
/// Accent color of weather embeds.
pub const WEATHER_COLOR: u32 = 0x87_ce_eb;

/// User-facing message when an on-demand query cannot be answered.
pub const QUERY_FAILURE_MESSAGE: &str = "⚠️ Unable to fetch data right now. Please try again later.";

const NO_WEATHER: &str = "🌤️ **No active weather conditions**";
const EMPTY_CATEGORY: &str = "_Nothing in stock_";

/// One presentation block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Embed {
    /// Heading line.
    pub title: String,
    /// Body text under the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sidebar color, `0xRRGGBB`.
    pub color: u32,
    /// RFC 3339.
    pub timestamp: String,
    /// Named blocks shown under the description.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// Small print at the bottom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

/// A named block inside an [`Embed`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Render side by side with neighbouring inline fields.
    #[serde(default)]
    pub inline: bool,
}

/// Footer line of an [`Embed`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
}

impl Embed {
    fn new(title: &str, color: u32, at: DateTime<Utc>) -> Self {
        Self {
            title: title.to_owned(),
            description: None,
            color,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            fields: Vec::new(),
            footer: None,
        }
    }
}

/// Snapshots that can be announced on the notification channel.
pub trait Announce: Snapshot {
    /// Embed sent when this snapshot is detected as a change.
    fn announcement(&self, at: DateTime<Utc>) -> Embed;
}

impl Announce for InventorySnapshot {
    fn announcement(&self, at: DateTime<Utc>) -> Embed {
        stock_embed(self, at)
    }
}

impl Announce for WeatherSnapshot {
    fn announcement(&self, at: DateTime<Utc>) -> Embed {
        weather_notice(self, at)
    }
}

/// Stock embed: one inline field per category present upstream.
pub fn stock_embed(snapshot: &InventorySnapshot, at: DateTime<Utc>) -> Embed {
    let mut embed = Embed::new("🌾 Grow a Garden — Current Stock", STOCK_COLOR, at);
    embed.footer = Some(EmbedFooter {
        text: "Updated every 5 minutes".into(),
    });
    for (category, items) in &snapshot.categories {
        embed.fields.push(EmbedField {
            name: category.heading().to_owned(),
            value: category_lines(*category, items),
            inline: true,
        });
    }
    embed
}

fn category_lines(category: Category, items: &[StockItem]) -> String {
    if items.is_empty() {
        return EMPTY_CATEGORY.to_owned();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "{} **{}**: `{}`",
                item_emoji(category, &item.name),
                item.name,
                group_thousands(item.quantity)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Change notice for weather: one line per active condition.
pub fn weather_notice(snapshot: &WeatherSnapshot, at: DateTime<Utc>) -> Embed {
    let mut embed = Embed::new("🌦️ Current Weather", WEATHER_COLOR, at);
    embed.description = Some(weather_lines(snapshot, |name| {
        format!("{} **{name}** is now active in Grow a Garden!", weather_emoji(name))
    }));
    embed
}

/// Weather block of the on-demand status report.
pub fn weather_status(snapshot: &WeatherSnapshot, at: DateTime<Utc>) -> Embed {
    let mut embed = Embed::new("☁️ Weather Status", WEATHER_COLOR, at);
    embed.description = Some(weather_lines(snapshot, |name| {
        format!("{} **{name}**", weather_emoji(name))
    }));
    embed
}

fn weather_lines(snapshot: &WeatherSnapshot, line: impl Fn(&str) -> String) -> String {
    if snapshot.is_empty() {
        return NO_WEATHER.to_owned();
    }
    snapshot
        .conditions()
        .iter()
        .map(|name| line(name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Combined on-demand report: stock then weather.
pub fn status_report(
    inventory: &InventorySnapshot,
    weather: &WeatherSnapshot,
    at: DateTime<Utc>,
) -> Vec<Embed> {
    vec![stock_embed(inventory, at), weather_status(weather, at)]
}

fn item_emoji(category: Category, name: &str) -> &'static str {
    let known = match (category, name) {
        (Category::Seeds, "Carrot") => Some("🥕"),
        (Category::Seeds, "Daffodil") => Some("🌼"),
        (Category::Seeds, "Strawberry") => Some("🍓"),
        (Category::Seeds, "Tomato") => Some("🍅"),
        (Category::Seeds, "Blueberry") => Some("🫐"),
        (Category::Eggs, "Common") => Some("🥚"),
        (Category::Eggs, "Rare") => Some("🐣"),
        (Category::Eggs, "Epic") => Some("🐤"),
        (Category::Eggs, "Legendary") => Some("🐥"),
        (Category::Gear, "WateringCan") => Some("💧"),
        (Category::Gear, "Shovel") => Some("🪣"),
        (Category::Gear, "Hoe") => Some("🪓"),
        (Category::Gear, "Gloves") => Some("🧤"),
        _ => None,
    };
    known.unwrap_or(match category {
        Category::Seeds => "🌱",
        Category::Eggs => "🥚",
        Category::Gear => "🛠️",
    })
}

fn weather_emoji(name: &str) -> &'static str {
    match name {
        "Sunny" => "☀️",
        "Rainy" => "🌧️",
        "Cloudy" => "☁️",
        "Stormy" => "⛈️",
        "Snowy" => "❄️",
        "Windy" => "🌬️",
        "Foggy" => "🌫️",
        _ => "🌤️",
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
