pub mod covers;
pub mod ingest;

pub use covers::{create_bucket_cover_host, create_cdn_cover_host, CoverHost};
pub use ingest::{ArtifactDelivery, BookAssetService, IngestSettings};
