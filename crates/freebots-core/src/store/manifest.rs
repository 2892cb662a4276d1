//! Catalog entries and their display form

use serde::{Deserialize, Deserializer, Serialize};

/// Features shown when an entry does not list its own
pub const DEFAULT_FEATURES: [&str; 3] = [
    "Automated Trading",
    "Risk Management",
    "Profit Optimization",
];

const DEFAULT_DIFFICULTY: &str = "Intermediate";
const DEFAULT_STRATEGY: &str = "Multi-Strategy";
const UNNAMED_BOT: &str = "Unnamed Bot";

/// One catalog row as returned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotManifestEntry {
    /// Opaque identifier
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Storage key of the XML file; also the cache key
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

impl BotManifestEntry {
    /// Create an entry with only the required fields set
    pub fn new(id: impl Into<String>, name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file: file.into(),
            description: None,
            difficulty: None,
            strategy: None,
            features: None,
        }
    }

    /// Name shown to users, derived from the file name when the entry has none
    ///
    /// Only a trailing `.xml` is stripped, so a stem like `xml.parser_bot.xml`
    /// keeps its inner `xml.`.
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }

        let stem = self.file.strip_suffix(".xml").unwrap_or(&self.file);
        let derived = stem.replace(['_', '-'], " ");
        if derived.trim().is_empty() {
            UNNAMED_BOT.to_string()
        } else {
            derived
        }
    }
}

/// Table columns can be `null`; treat that like an empty value
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Display form of a catalog entry, with fallbacks applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotCard {
    pub id: String,
    pub name: String,
    pub file: String,
    pub description: String,
    pub difficulty: String,
    pub strategy: String,
    pub features: Vec<String>,
    /// XML text, once resolved
    pub xml: Option<String>,
}

impl BotCard {
    /// Whether the card can be loaded into the workspace yet
    pub fn is_loadable(&self) -> bool {
        self.xml.is_some()
    }

    /// Return the card with its XML filled in
    pub fn with_xml(mut self, xml: impl Into<String>) -> Self {
        self.xml = Some(xml.into());
        self
    }
}

impl From<&BotManifestEntry> for BotCard {
    fn from(entry: &BotManifestEntry) -> Self {
        let name = entry.display_name();
        Self {
            id: entry.id.clone(),
            description: entry
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("Advanced trading bot: {}", name)),
            difficulty: entry
                .difficulty
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            strategy: entry
                .strategy
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STRATEGY.to_string()),
            features: entry
                .features
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect()),
            file: entry.file.clone(),
            name,
            xml: None,
        }
    }
}
