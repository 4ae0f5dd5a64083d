//! EXTINF line parsing and serialization
//!
//! Format: `#EXTINF:-1 tvg-id="..." tvg-logo="..." group-title="...",Display Name`

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{AttributeMap, Extinf, ParsedExtinf};

/// Marker that starts every metadata line
pub const EXTINF_MARKER: &str = "#EXTINF";

/// Duration written on every rebuilt line (live streams)
const DURATION_PLACEHOLDER: &str = "-1";

/// Pseudo attribute holding the display name, never written as `key="value"`
const NAME_KEY: &str = "name";

lazy_static! {
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parse an EXTINF line into its attributes and display name.
///
/// Only the first comma separates attributes from the name, so names may
/// contain commas. A line without any comma yields [`ParsedExtinf::Empty`].
/// Pairs with broken quoting are dropped; a repeated key keeps its last value.
pub fn parse_extinf(line: &str) -> ParsedExtinf {
    let Some((header, name)) = line.split_once(',') else {
        return ParsedExtinf::Empty;
    };

    let mut attributes = AttributeMap::new();
    for caps in ATTR_REGEX.captures_iter(header) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        attributes.insert(key.to_string(), value.to_string());
    }

    ParsedExtinf::Entry(Extinf {
        attributes,
        name: name.trim().to_string(),
    })
}

/// Build an EXTINF line from attributes and a display name.
///
/// Empty values are omitted. The name is written verbatim.
pub fn build_extinf(attributes: &AttributeMap, name: &str) -> String {
    let attrs = attributes
        .iter()
        .filter(|(key, value)| !value.is_empty() && key.as_str() != NAME_KEY)
        .map(|(key, value)| format!(r#"{}="{}""#, key, value))
        .collect::<Vec<_>>()
        .join(" ");

    format!("{}:{} {},{}", EXTINF_MARKER, DURATION_PLACEHOLDER, attrs, name)
}
