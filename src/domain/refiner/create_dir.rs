use uuid::Uuid;

use crate::domain::utils::id::JobId;
use crate::domain::workflow::dependency::Dependency;
use crate::domain::workflow::job::{Job, JobType};
use crate::domain::workflow::workflow::Workflow;
use crate::error::GraphError;

/// Name of the per run work directory created on every site.
pub fn run_directory(workflow_label: &str, run_id: &Uuid) -> String {
    format!("{}-{}", workflow_label, run_id)
}

/// Adds one `create_dir_<label>_<site>` job per site in use and makes it a parent of every job
/// mapped to that site.
pub fn add_create_dir_jobs(workflow: &mut Workflow, run_id: &Uuid) -> Result<Vec<JobId>, GraphError> {
    let directory = run_directory(&workflow.label, run_id);
    let mut added = Vec::new();

    for site in workflow.used_sites() {
        let jobs_on_site: Vec<JobId> = workflow.jobs().filter(|job| job.site.as_ref() == Some(&site)).map(|job| job.id.clone()).collect();

        let mut create_dir = Job::auxiliary(format!("create_dir_{}_{}", workflow.label, site), JobType::CreateDir, site.clone());
        create_dir.arguments.push(directory.clone());
        let create_dir_id = create_dir.id.clone();
        workflow.add_job(create_dir)?;

        for job in &jobs_on_site {
            workflow.add_dependency(&create_dir_id, job, Dependency::default())?;
        }
        log::debug!("{} creates {} on site {} for {} jobs.", create_dir_id, directory, site, jobs_on_site.len());
        added.push(create_dir_id);
    }
    Ok(added)
}
