//! OpenAPI specification tracking: diffing two revisions of a spec,
//! summarizing the diff and turning spec history into daily entries.

pub mod diff;
pub mod ingest;
pub mod summary;

pub use diff::{OpenApiChangesRunner, OpenApiDiff, SpecDiffer};
pub use ingest::{
    EntryBuilder, IngestReport, OpenApiCommit, OpenApiEntryBuilder,
    OpenApiIngestResult, ingest_openapi_commits,
};
pub use summary::{AnalyzedChanges, ChangeCategory, analyze_openapi_changes};
