//! Sequential fetch-and-merge loop over all configured sources

use tracing::{info, warn};

use crate::models::{MergeOutput, SourceDescriptor};
use crate::services::fetcher::PlaylistFetcher;
use crate::services::merger::PlaylistMerger;

/// Outcome of one aggregation run
#[derive(Debug)]
pub struct AggregateReport {
    pub output: MergeOutput,
    /// Labels of sources that were merged
    pub succeeded: Vec<String>,
    /// Labels of skipped sources with the reason
    pub failed: Vec<(String, String)>,
}

/// Fetch and merge every source in order.
///
/// A source that fails to fetch is logged and skipped; nothing from it reaches
/// the merger.
pub async fn aggregate<F>(sources: &[SourceDescriptor], fetcher: &F) -> AggregateReport
where
    F: PlaylistFetcher + ?Sized,
{
    let mut merger = PlaylistMerger::new();
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();

    for source in sources {
        info!(source = %source.label, "Processing playlist");

        let content = match fetcher.fetch(source).await {
            Ok(content) => content,
            Err(e) => {
                warn!(source = %source.label, url = %source.url, error = %e, "Skipping playlist");
                failed.push((source.label.clone(), e.to_string()));
                continue;
            }
        };

        info!(source = %source.label, content_length = content.len(), "Fetched playlist");

        let stats = merger.merge_source(source, &content);
        info!(
            source = %source.label,
            entries = stats.entries,
            new_channels = stats.new_channels,
            duplicates = stats.duplicates,
            passthrough = stats.passthrough,
            "Merged playlist"
        );
        succeeded.push(source.label.clone());
    }

    info!(
        merged = succeeded.len(),
        skipped = failed.len(),
        channels = merger.channel_count(),
        "Finished processing all playlists"
    );

    AggregateReport {
        output: merger.finish(),
        succeeded,
        failed,
    }
}
