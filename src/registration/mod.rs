//! # Registration Flow
//!
//! Submission lifecycle, the deferred aggregated-profile read it arms, and
//! the XML export offered once a registration has been accepted.

pub mod coordinator;
pub mod export;
pub mod profile_fetcher;

pub use coordinator::{
    SubmissionCoordinator, SubmissionPhase, SubmissionResult, SubmissionSnapshot,
};
pub use export::{ArtifactSink, ExportArtifact, FileArtifactSink};
pub use profile_fetcher::{AggregatedProfileFetcher, ProfileState};
