pub mod aggregator;
pub mod extinf;
pub mod fetcher;
pub mod merger;
pub mod publisher;

#[cfg(test)]
pub mod http_stub;
