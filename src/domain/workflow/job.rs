use std::fmt;
use std::str::FromStr;

use crate::domain::utils::id::{JobId, Lfn, SITE_NOT_FOUND, SiteName, TransformationName};
use crate::error::ConversionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    Input,
    Output,
}

impl FromStr for FileRole {
    type Err = ConversionError;

    fn from_str(role: &str) -> Result<FileRole, Self::Err> {
        match role.to_ascii_lowercase().as_str() {
            "input" | "in" => Ok(FileRole::Input),
            "output" | "out" => Ok(FileRole::Output),
            _ => Err(ConversionError::UnknownFileRole(role.to_string())),
        }
    }
}

/// A logical file used by a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkflowFile {
    pub lfn: Lfn,
    pub role: FileRole,

    /// Input: the file has to be staged to the execution site.
    /// Output: the file has to be kept/staged out after the job finished.
    pub transfer: bool,
}

impl WorkflowFile {
    pub fn input(lfn: impl Into<String>) -> Self {
        WorkflowFile { lfn: Lfn::new(lfn), role: FileRole::Input, transfer: true }
    }

    pub fn output(lfn: impl Into<String>) -> Self {
        WorkflowFile { lfn: Lfn::new(lfn), role: FileRole::Output, transfer: true }
    }

    pub fn with_transfer(mut self, transfer: bool) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn is_input(&self) -> bool {
        self.role == FileRole::Input
    }

    pub fn is_output(&self) -> bool {
        self.role == FileRole::Output
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    Compute,
    StageIn,
    StageOut,
    InterSiteTransfer,
    CreateDir,
    Cleanup,
}

impl JobType {
    pub fn is_compute(&self) -> bool {
        matches!(self, JobType::Compute)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobType::Compute => "compute",
            JobType::StageIn => "stage-in",
            JobType::StageOut => "stage-out",
            JobType::InterSiteTransfer => "inter-site-transfer",
            JobType::CreateDir => "create-dir",
            JobType::Cleanup => "cleanup",
        };
        write!(f, "{}", name)
    }
}

/// One computational step of the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub transformation: TransformationName,
    pub job_type: JobType,

    /// `None` until site selection mapped the job (printed as `NONE`).
    pub site: Option<SiteName>,

    /// Estimated runtime in seconds, used when the transformation catalog has no per-site estimate.
    pub runtime: f64,

    pub files: Vec<WorkflowFile>,

    /// Label used by label based clustering.
    pub label: Option<String>,

    /// Pins the job to exactly one execution site.
    pub execution_site_hint: Option<SiteName>,

    /// Jobs merged into this one by clustering.
    pub clustered_jobs: Vec<JobId>,

    /// Arguments of auxiliary jobs (directories to create, files to remove).
    pub arguments: Vec<String>,
}

impl Job {
    pub fn new(id: impl Into<String>, transformation: impl Into<String>, runtime: f64) -> Self {
        Job {
            id: JobId::new(id),
            transformation: TransformationName::new(transformation),
            job_type: JobType::Compute,
            site: None,
            runtime,
            files: Vec::new(),
            label: None,
            execution_site_hint: None,
            clustered_jobs: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Auxiliary job created by one of the refiners; it is mapped to `site` right away.
    pub fn auxiliary(id: impl Into<String>, job_type: JobType, site: SiteName) -> Self {
        let transformation = match job_type {
            JobType::StageIn | JobType::StageOut | JobType::InterSiteTransfer => "planner::transfer",
            JobType::CreateDir => "planner::dirmanager",
            JobType::Cleanup => "planner::cleanup",
            JobType::Compute => "planner::noop",
        };
        let mut job = Job::new(id, transformation, 0.0);
        job.job_type = job_type;
        job.site = Some(site);
        job
    }

    pub fn with_file(mut self, file: WorkflowFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn input_files(&self) -> impl Iterator<Item = &WorkflowFile> {
        self.files.iter().filter(|file| file.is_input())
    }

    pub fn output_files(&self) -> impl Iterator<Item = &WorkflowFile> {
        self.files.iter().filter(|file| file.is_output())
    }

    pub fn uses_as_input(&self, lfn: &Lfn) -> bool {
        self.input_files().any(|file| &file.lfn == lfn)
    }

    pub fn produces(&self, lfn: &Lfn) -> bool {
        self.output_files().any(|file| &file.lfn == lfn)
    }

    pub fn site_handle(&self) -> &str {
        self.site.as_ref().map(|site| site.as_str()).unwrap_or(SITE_NOT_FOUND)
    }

    pub fn is_mapped(&self) -> bool {
        self.site.is_some()
    }
}
