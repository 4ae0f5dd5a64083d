//! Playlist merging
//!
//! Re-tags every entry of a source document with the source label, appends it
//! to one combined M3U document and records first-seen channel metadata in an
//! index keyed by lower-cased channel name.

use deunicode::deunicode;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{ChannelRecord, MergeOutput, MergeStats, SourceDescriptor};
use crate::services::extinf::{build_extinf, parse_extinf, EXTINF_MARKER};

/// Header of the combined document
pub const PLAYLIST_HEADER: &str = "#EXTM3U\n\n";

const GROUP_TITLE: &str = "group-title";
const TVG_LOGO: &str = "tvg-logo";

/// Accumulates the combined playlist and channel index across sources
#[derive(Debug)]
pub struct PlaylistMerger {
    playlist: String,
    channels: HashMap<String, ChannelRecord>,
}

impl Default for PlaylistMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistMerger {
    pub fn new() -> Self {
        Self {
            playlist: PLAYLIST_HEADER.to_string(),
            channels: HashMap::new(),
        }
    }

    /// Number of distinct channels seen so far
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Merge one fetched source document.
    ///
    /// Metadata lines get `group-title` forced to the source label, stream URL
    /// lines are followed by a blank line, everything else is copied verbatim.
    pub fn merge_source(&mut self, source: &SourceDescriptor, content: &str) -> MergeStats {
        let mut stats = MergeStats::default();

        for line in content.split('\n') {
            let trimmed = line.trim();

            if trimmed.starts_with(EXTINF_MARKER) {
                stats.entries += 1;

                let parsed = parse_extinf(trimmed);
                if parsed.is_empty() {
                    tracing::debug!(source = %source.label, line = %trimmed, "EXTINF line without channel name");
                }

                let mut extinf = parsed.into_entry().unwrap_or_default();
                extinf.set_attribute(GROUP_TITLE, &source.label);

                if !extinf.name.is_empty() {
                    if self.register_channel(&extinf.name, source, extinf.attribute(TVG_LOGO)) {
                        stats.new_channels += 1;
                    } else {
                        stats.duplicates += 1;
                    }
                }

                self.playlist.push_str(&build_extinf(&extinf.attributes, &extinf.name));
                self.playlist.push('\n');
            } else if trimmed.starts_with("http") {
                self.playlist.push_str(trimmed);
                self.playlist.push_str("\n\n");
            } else {
                stats.passthrough += 1;
                self.playlist.push_str(line);
                self.playlist.push('\n');
            }
        }

        stats
    }

    /// Insert a channel record unless its lower-cased name is already known.
    /// Returns true when a new record was created.
    fn register_channel(&mut self, name: &str, source: &SourceDescriptor, logo: Option<&str>) -> bool {
        let key = name.to_lowercase();
        if self.channels.contains_key(&key) {
            return false;
        }

        self.channels.insert(
            key,
            ChannelRecord {
                name: name.to_string(),
                category: source.label.clone(),
                tvg_logo: logo.unwrap_or_default().to_string(),
            },
        );
        true
    }

    /// Finish the run: combined document plus the channel index sorted by name
    pub fn finish(self) -> MergeOutput {
        let mut channels: Vec<ChannelRecord> = self.channels.into_values().collect();
        channels.sort_by(|a, b| compare_names(&a.name, &b.name));

        MergeOutput {
            playlist: self.playlist,
            channels,
        }
    }
}

/// Locale-style name ordering: accents and case folded first, raw text breaks ties
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded_a = deunicode(a).to_lowercase();
    let folded_b = deunicode(b).to_lowercase();

    folded_a.cmp(&folded_b).then_with(|| a.cmp(b))
}
