use std::collections::BTreeSet;

use crate::domain::catalog::replica_catalog::{PhysicalLocation, ReplicaCatalog};
use crate::domain::utils::id::{JobId, Lfn, SiteName};
use crate::domain::workflow::dependency::Dependency;
use crate::domain::workflow::job::{Job, JobType, WorkflowFile};
use crate::domain::workflow::workflow::Workflow;
use crate::error::StageError;

/**
 * Adds the data movement a mapped workflow needs.
 *
 * - inter-site transfers for files passed between jobs on different sites,
 * - stage-in jobs for inputs no parent produces (taken from the replica catalog),
 * - stage-out jobs for outputs marked for transfer, if an output site is configured.
 */
#[derive(Debug)]
pub struct TransferEngine<'a> {
    replica_catalog: &'a dyn ReplicaCatalog,
    output_site: Option<&'a SiteName>,
}

impl<'a> TransferEngine<'a> {
    pub fn new(replica_catalog: &'a dyn ReplicaCatalog, output_site: Option<&'a SiteName>) -> Self {
        TransferEngine { replica_catalog, output_site }
    }

    /// Returns the ids of all added transfer jobs.
    pub fn insert_transfer_nodes(&self, workflow: &mut Workflow) -> Result<Vec<JobId>, StageError> {
        let compute_jobs: Vec<JobId> = workflow.jobs().filter(|job| job.job_type.is_compute()).map(|job| job.id.clone()).collect();

        // Decided on the untouched graph: afterwards parents may be transfer jobs.
        let mut stage_in_files: Vec<(JobId, Vec<(Lfn, PhysicalLocation)>)> = Vec::new();
        for id in &compute_jobs {
            let files = self.files_to_stage_in(workflow, id)?;
            if !files.is_empty() {
                stage_in_files.push((id.clone(), files));
            }
        }

        let mut added = self.insert_inter_site_transfers(workflow)?;

        for (id, files) in stage_in_files {
            let Some(site) = workflow.job(&id).and_then(|job| job.site.clone()) else {
                continue;
            };
            let mut stage_in = Job::auxiliary(format!("stage_in_{}", id), JobType::StageIn, site);
            for (lfn, location) in files {
                stage_in.arguments.push(format!("{} {}", location.url, lfn));
                stage_in.files.push(WorkflowFile::output(lfn.id));
            }
            let stage_in_id = stage_in.id.clone();
            workflow.add_job(stage_in)?;
            workflow.add_dependency(&stage_in_id, &id, Dependency::default())?;
            added.push(stage_in_id);
        }

        if let Some(output_site) = self.output_site {
            for id in &compute_jobs {
                if let Some(stage_out) = Self::stage_out_job(workflow, id, output_site) {
                    let stage_out_id = stage_out.id.clone();
                    workflow.add_job(stage_out)?;
                    workflow.add_dependency(id, &stage_out_id, Dependency::default())?;
                    added.push(stage_out_id);
                }
            }
        }

        log::info!("Added {} transfer jobs.", added.len());
        Ok(added)
    }

    /// Inputs of `id` marked for transfer that none of its parents produces, with their replica.
    fn files_to_stage_in(&self, workflow: &Workflow, id: &JobId) -> Result<Vec<(Lfn, PhysicalLocation)>, StageError> {
        let Some(job) = workflow.job(id) else {
            return Ok(Vec::new());
        };
        let parents = workflow.graph.parents(id);

        let mut files = Vec::new();
        let mut seen: BTreeSet<&Lfn> = BTreeSet::new();
        for file in job.input_files().filter(|file| file.transfer) {
            if !seen.insert(&file.lfn) {
                continue;
            }
            let produced_by_parent = parents.iter().filter_map(|parent| workflow.job(parent)).any(|parent| parent.produces(&file.lfn));
            if produced_by_parent {
                continue;
            }

            let locations = self.replica_catalog.lookup(&file.lfn);
            let location = locations
                .iter()
                .find(|location| location.site.is_some() && location.site == job.site)
                .or_else(|| locations.first())
                .cloned()
                .ok_or_else(|| StageError::MissingReplica { job: id.clone(), lfn: file.lfn.clone() })?;
            files.push((file.lfn.clone(), location));
        }
        Ok(files)
    }

    /// Puts a transfer job on the child's site between every pair of jobs on different sites that
    /// pass files. The direct edge is replaced by the path through the transfer job.
    fn insert_inter_site_transfers(&self, workflow: &mut Workflow) -> Result<Vec<JobId>, StageError> {
        let mut added = Vec::new();

        for (parent_id, child_id) in workflow.graph.edges() {
            let (Some(parent), Some(child)) = (workflow.job(&parent_id), workflow.job(&child_id)) else {
                continue;
            };
            let (Some(parent_site), Some(child_site)) = (&parent.site, &child.site) else {
                continue;
            };
            if parent_site == child_site {
                continue;
            }

            let shared: Vec<Lfn> = parent.output_files().filter(|file| child.uses_as_input(&file.lfn)).map(|file| file.lfn.clone()).collect();
            if shared.is_empty() {
                continue;
            }

            let mut transfer = Job::auxiliary(format!("inter_tx_{}_{}", parent_id, child_id), JobType::InterSiteTransfer, child_site.clone());
            transfer.arguments.push(format!("{} -> {}", parent_site, child_site));
            for lfn in shared {
                transfer.arguments.push(lfn.id.clone());
                transfer.files.push(WorkflowFile::output(lfn.id));
            }

            let transfer_id = transfer.id.clone();
            let dependency = workflow.graph.remove_edge(&parent_id, &child_id).unwrap_or_default();
            workflow.add_job(transfer)?;
            workflow.add_dependency(&parent_id, &transfer_id, dependency)?;
            workflow.add_dependency(&transfer_id, &child_id, Dependency::default())?;
            log::debug!("Inter-site transfer {} added.", transfer_id);
            added.push(transfer_id);
        }
        Ok(added)
    }

    fn stage_out_job(workflow: &Workflow, id: &JobId, output_site: &SiteName) -> Option<Job> {
        let job = workflow.job(id)?;
        let site = job.site.clone()?;
        let outputs: Vec<&WorkflowFile> = job.output_files().filter(|file| file.transfer).collect();
        if outputs.is_empty() {
            return None;
        }

        let mut stage_out = Job::auxiliary(format!("stage_out_{}", id), JobType::StageOut, site);
        let mut staged: BTreeSet<&Lfn> = BTreeSet::new();
        for file in outputs {
            if staged.insert(&file.lfn) {
                stage_out.arguments.push(format!("{} -> {}", file.lfn, output_site));
                stage_out.files.push(WorkflowFile::input(file.lfn.id.clone()));
            }
        }
        Some(stage_out)
    }
}
