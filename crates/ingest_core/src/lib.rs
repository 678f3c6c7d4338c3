//! Ingest core: pure data model, settings snapshot, and batch bookkeeping.
mod batch;
mod citation;
mod collaborator;
mod error;
mod model;
mod settings;
mod state;

pub use batch::{select_candidates, BatchOutcome, BatchSummary, BatchTally, CandidateEntry};
pub use citation::{format_citation, remote_link, title_tag};
pub use collaborator::{DocumentStore, Notifier, ProgressReporter, Selector, StoreError};
pub use error::ImportError;
pub use model::{ImportRequest, NormalizedDocument, RawDocument};
pub use settings::{FetchLimits, FieldNames, PocketCredentials, Settings};
pub use state::{FeedState, SourceLog};
