use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered attribute map of an EXTINF line (`tvg-logo="..."`, `group-title="..."`).
/// Insertion order is kept so serialized output is reproducible.
pub type AttributeMap = IndexMap<String, String>;

/// One remote playlist to aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Display label, also forced as `group-title` on every entry of this source
    pub label: String,
    pub url: String,
}

impl SourceDescriptor {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Attributes and display name of a parsed EXTINF line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extinf {
    pub attributes: AttributeMap,
    pub name: String,
}

impl Extinf {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Set an attribute, keeping its original position if it already exists
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }
}

/// Best-effort parse result of an EXTINF line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedExtinf {
    /// No comma separating attributes from a display name
    Empty,
    Entry(Extinf),
}

impl ParsedExtinf {
    pub fn is_empty(&self) -> bool {
        matches!(self, ParsedExtinf::Empty)
    }

    pub fn into_entry(self) -> Option<Extinf> {
        match self {
            ParsedExtinf::Empty => None,
            ParsedExtinf::Entry(extinf) => Some(extinf),
        }
    }
}

/// Deduplicated channel metadata, one per lower-cased channel name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    /// Label of the source that first contributed this channel
    pub category: String,
    #[serde(rename = "tvg-logo")]
    pub tvg_logo: String,
}

/// Counters for one merged source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub entries: usize,
    pub new_channels: usize,
    pub duplicates: usize,
    pub passthrough: usize,
}

/// Final artifacts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutput {
    /// Combined M3U document
    pub playlist: String,
    /// Channel index, sorted by name
    pub channels: Vec<ChannelRecord>,
}

impl MergeOutput {
    /// Channel index as pretty-printed JSON (2-space indent)
    pub fn channels_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.channels)
    }
}
