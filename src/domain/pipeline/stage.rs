use std::fmt;

use crate::error::{NoCandidateSiteWarning, SiteAuthenticationError};

/// The refinement stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Authenticate,
    Reduce,
    SiteSelect,
    Cluster,
    InsertTransferNodes,
    CreateDirectories,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authenticate => "Authenticate",
            Stage::Reduce => "Reduce",
            Stage::SiteSelect => "SiteSelect",
            Stage::Cluster => "Cluster",
            Stage::InsertTransferNodes => "InsertTransferNodes",
            Stage::CreateDirectories => "CreateDirectories",
            Stage::Cleanup => "Cleanup",
        };
        write!(f, "{}", name)
    }
}

/// Recoverable problem a stage worked around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageWarning {
    SiteAuthentication(SiteAuthenticationError),
    NoCandidateSite(NoCandidateSiteWarning),
}

impl fmt::Display for StageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageWarning::SiteAuthentication(error) => write!(f, "{}", error),
            StageWarning::NoCandidateSite(warning) => write!(f, "{}", warning),
        }
    }
}

/// What one stage did to the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub skipped: bool,
    pub jobs_before: usize,
    pub jobs_after: usize,
    pub warnings: Vec<StageWarning>,
}

impl StageReport {
    pub fn new(stage: Stage, jobs_before: usize) -> Self {
        StageReport { stage, skipped: false, jobs_before, jobs_after: jobs_before, warnings: Vec::new() }
    }

    pub fn log_summary(&self) {
        if self.skipped {
            log::info!("Stage {} skipped.", self.stage);
            return;
        }
        log::info!("Stage {} finished: {} -> {} jobs.", self.stage, self.jobs_before, self.jobs_after);
        if !self.warnings.is_empty() {
            log::warn!("Stage {} recovered from {} problem(s):", self.stage, self.warnings.len());
            for warning in &self.warnings {
                log::warn!("  {}", warning);
            }
        }
    }
}
