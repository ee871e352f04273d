use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::domain::utils::id::{JobId, Lfn, SiteName};
use crate::domain::workflow::dependency::Dependency;
use crate::domain::workflow::job::{Job, JobType};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{ConversionError, GraphError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupMode {
    #[default]
    None,
    /// Cleanup jobs inside the workflow, removing files as soon as their last user finished.
    InPlace,
    /// A separate workflow removing everything after the main workflow finished.
    Separate,
}

impl FromStr for CleanupMode {
    type Err = ConversionError;

    fn from_str(mode: &str) -> Result<CleanupMode, Self::Err> {
        match mode.to_ascii_lowercase().as_str() {
            "none" => Ok(CleanupMode::None),
            "inplace" | "in-place" => Ok(CleanupMode::InPlace),
            "separate" => Ok(CleanupMode::Separate),
            _ => Err(ConversionError::UnknownCleanupMode(mode.to_string())),
        }
    }
}

impl fmt::Display for CleanupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupMode::None => write!(f, "none"),
            CleanupMode::InPlace => write!(f, "inplace"),
            CleanupMode::Separate => write!(f, "separate"),
        }
    }
}

/**
 * Collects, per site, the files the workflow leaves behind and the jobs using them there.
 *
 * Workflow outputs marked for transfer stay untouched when there is no output site to stage
 * them to.
 * Transfer jobs reading a file from a site (inter-site transfers and stage-out jobs that are
 * children of a user) count as users of that site as well.
 */
fn files_per_site(workflow: &Workflow, keep_transferred_outputs: bool) -> BTreeMap<SiteName, BTreeMap<Lfn, BTreeSet<JobId>>> {
    let kept: BTreeSet<&Lfn> = if keep_transferred_outputs {
        workflow.jobs().filter(|job| job.job_type.is_compute()).flat_map(|job| job.output_files()).filter(|file| file.transfer).map(|file| &file.lfn).collect()
    } else {
        BTreeSet::new()
    };

    let mut files: BTreeMap<SiteName, BTreeMap<Lfn, BTreeSet<JobId>>> = BTreeMap::new();
    for job in workflow.jobs().filter(|job| !matches!(job.job_type, JobType::CreateDir | JobType::Cleanup)) {
        let Some(site) = &job.site else {
            continue;
        };
        let readers: Vec<&JobId> = workflow
            .graph
            .children(&job.id)
            .iter()
            .filter(|child| workflow.job(child).is_some_and(|child| matches!(child.job_type, JobType::InterSiteTransfer | JobType::StageOut)))
            .collect();

        for file in job.files.iter().filter(|file| !kept.contains(&file.lfn)) {
            let users = files.entry(site.clone()).or_default().entry(file.lfn.clone()).or_default();
            users.insert(job.id.clone());
            users.extend(readers.iter().map(|reader| (*reader).clone()));
        }
    }
    files
}

/// Adds `clean_up_<site>_<n>` jobs; files with the same users on a site share one cleanup job,
/// which runs after all of them.
pub fn add_inplace_cleanup(workflow: &mut Workflow, output_site: Option<&SiteName>) -> Result<Vec<JobId>, GraphError> {
    let mut added = Vec::new();

    for (site, files) in files_per_site(workflow, output_site.is_none()) {
        let mut by_users: BTreeMap<BTreeSet<JobId>, Vec<Lfn>> = BTreeMap::new();
        for (lfn, users) in files {
            by_users.entry(users).or_default().push(lfn);
        }

        for (index, (users, lfns)) in by_users.into_iter().enumerate() {
            let mut cleanup = Job::auxiliary(format!("clean_up_{}_{}", site, index), JobType::Cleanup, site.clone());
            cleanup.arguments = lfns.into_iter().map(String::from).collect();
            let cleanup_id = cleanup.id.clone();
            workflow.add_job(cleanup)?;
            for user in &users {
                workflow.add_dependency(user, &cleanup_id, Dependency::default())?;
            }
            added.push(cleanup_id);
        }
    }

    log::info!("Added {} in-place cleanup jobs.", added.len());
    Ok(added)
}

/// Derives a workflow with one independent `clean_up_<site>` job per site removing every file the
/// main workflow left there. The main workflow is not changed.
pub fn build_cleanup_workflow(workflow: &Workflow, output_site: Option<&SiteName>) -> Result<Workflow, GraphError> {
    let mut cleanup_workflow = Workflow::new(format!("{}-cleanup", workflow.label));

    for (site, files) in files_per_site(workflow, output_site.is_none()) {
        let mut cleanup = Job::auxiliary(format!("clean_up_{}", site), JobType::Cleanup, site.clone());
        cleanup.arguments = files.into_keys().map(String::from).collect();
        cleanup_workflow.add_job(cleanup)?;
    }

    log::info!("Cleanup workflow '{}' has {} jobs.", cleanup_workflow.label, cleanup_workflow.len());
    Ok(cleanup_workflow)
}
