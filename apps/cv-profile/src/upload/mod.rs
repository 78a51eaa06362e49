// Upload flow: allow-list check, persistence, then photo/text/section extraction.
// The extractors are blocking and run inside tokio::task::spawn_blocking.

pub mod pipeline;

pub use pipeline::UploadPipeline;
