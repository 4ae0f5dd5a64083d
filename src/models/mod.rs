pub mod gist;
pub mod playlist;

pub use gist::{GistFile, GistRequest, GistResponse};
pub use playlist::{
    AttributeMap, ChannelRecord, Extinf, MergeOutput, MergeStats, ParsedExtinf, SourceDescriptor,
};
