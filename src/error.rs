use std::fmt;

use thiserror::Error;

use crate::domain::pipeline::stage::Stage;
use crate::domain::utils::id::{JobId, Lfn, SiteName, TransformationName};

/// Structural errors of the graph model. Always fatal to the operation that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("DuplicateNodeError: node '{0}' already exists in the graph")]
    DuplicateNode(String),

    #[error("UnknownNodeError: node '{0}' does not exist in the graph")]
    UnknownNode(String),

    #[error("InvalidEdgeError: edge '{parent}' -> '{child}' is not allowed ({reason})")]
    InvalidEdge { parent: String, child: String, reason: String },
}

/// The workflow contains a cycle. `edge` is the offending parent/child pair, if one could be
/// singled out by the traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct CyclicWorkflowError {
    pub edge: Option<(String, String)>,
}

impl fmt::Display for CyclicWorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.edge {
            Some((parent, child)) => write!(f, "CyclicWorkflowError: the workflow contains a cycle closed by edge '{}' -> '{}'", parent, child),
            None => write!(f, "CyclicWorkflowError: the workflow contains a cycle (no single offending edge)"),
        }
    }
}

/// Contract violations of the site simulator. These are bugs, never user facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("IllegalScheduleStateError: site '{0}' was asked to commit a job without a preceding probe")]
    IllegalScheduleState(SiteName),

    #[error("Site '{0}' is not part of the simulated site pool")]
    UnknownSite(SiteName),
}

/// Per-job, recoverable: no authenticated site can run the job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("NoCandidateSiteWarning: job '{job}' ({transformation}) cannot run on any of the candidate sites")]
pub struct NoCandidateSiteWarning {
    pub job: JobId,
    pub transformation: TransformationName,
}

/// Per-site, recoverable: the site is pruned from the candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SiteAuthenticationError: site '{site}' could not be authenticated: {reason}")]
pub struct SiteAuthenticationError {
    pub site: SiteName,
    pub reason: String,
}

/// Fatal causes a refinement stage can fail with.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Cyclic(#[from] CyclicWorkflowError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("No site left after authentication ({} site(s) failed)", failures.len())]
    NoAuthenticatedSites { failures: Vec<SiteAuthenticationError> },

    #[error("Requested execution site '{0}' is not in the site catalog")]
    UnknownSite(SiteName),

    #[error("{} compute job(s) could not be mapped to any site: {}", jobs.len(), join_ids(jobs))]
    UnmappedJobs { jobs: Vec<JobId> },

    #[error("No replica found for input file '{lfn}' of job '{job}'")]
    MissingReplica { job: JobId, lfn: Lfn },
}

/// Failures while converting configuration names into their typed counterparts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Unknown site selector: '{0}'")]
    UnknownSiteSelector(String),

    #[error("Unknown clustering technique: '{0}'")]
    UnknownClustering(String),

    #[error("Unknown cleanup mode: '{0}'")]
    UnknownCleanupMode(String),

    #[error("Unknown file role: '{0}'")]
    UnknownFileRole(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write CSV report: {0}")]
    ReportError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    ConversionError(#[from] ConversionError),

    #[error("Failed to build workflow: {0}")]
    WorkflowConstructionError(#[from] GraphError),

    #[error("Refinement stage {stage} failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: StageError,
    },
}

impl Error {
    pub fn stage_failed(stage: Stage, source: impl Into<StageError>) -> Self {
        Error::StageFailed { stage, source: source.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn join_ids(jobs: &[JobId]) -> String {
    jobs.iter().map(|job| job.id.as_str()).collect::<Vec<_>>().join(", ")
}
