use std::collections::HashMap;

use crate::domain::catalog::site_catalog::SiteEntry;
use crate::domain::scheduler::cost_model::CostModel;
use crate::domain::scheduler::heft_bag::HeftBag;
use crate::domain::scheduler::site::{Site, SitePool};
use crate::domain::utils::id::{JobId, SITE_NOT_FOUND, SiteName};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{NoCandidateSiteWarning, StageError};

/// Maps every job of a workflow to an execution site.
pub trait SiteSelector: std::fmt::Debug {
    fn description(&self) -> String;

    /**
     * Sets `job.site` for every job that can run on one of the cost model's sites.
     *
     * Jobs without a candidate site keep the `NONE` site and are reported as warnings in the
     * returned selection.
     */
    fn map_workflow(&mut self, workflow: &mut Workflow, cost_model: &CostModel) -> Result<SiteSelection, StageError>;
}

/// Result of a site selection run.
#[derive(Debug, Clone, Default)]
pub struct SiteSelection {
    /// Jobs in the order they were placed.
    pub order: Vec<JobId>,
    pub bags: HashMap<JobId, HeftBag>,
    pub sinks: Vec<JobId>,
    pub warnings: Vec<NoCandidateSiteWarning>,
}

impl SiteSelection {
    /// Latest finish time over all sink jobs.
    pub fn makespan(&self) -> f64 {
        self.sinks.iter().filter_map(|sink| self.bags.get(sink)).map(|bag| bag.actual_finish_time).fold(0.0, f64::max)
    }

    pub fn bag(&self, job: &JobId) -> Option<&HeftBag> {
        self.bags.get(job)
    }

    pub fn summary(&self) -> ScheduleSummary {
        let entries = self
            .order
            .iter()
            .filter_map(|job| self.bags.get(job).map(|bag| (job, bag)))
            .map(|(job, bag)| ScheduleEntry {
                job: job.clone(),
                site: bag.site.as_ref().map(|site| site.id.clone()).unwrap_or_else(|| SITE_NOT_FOUND.to_string()),
                start: bag.actual_start_time,
                finish: bag.actual_finish_time,
            })
            .collect();
        ScheduleSummary { entries, makespan: self.makespan() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub job: JobId,
    pub site: String,
    pub start: f64,
    pub finish: f64,
}

/// Read-only view of a schedule for reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSummary {
    pub entries: Vec<ScheduleEntry>,
    pub makespan: f64,
}

/// Builds a fresh simulated site for every site of the cost model.
pub fn build_site_pool(cost_model: &CostModel) -> SitePool {
    SitePool::new(cost_model.sites().iter().map(|entry: &SiteEntry| Site::new(entry.name.clone(), cost_model.processor_count(entry))))
}

/**
 * Earliest time `job` can start on `site` once all its parents finished and their data arrived.
 *
 * Parents on the same site cause no transfer; parents elsewhere (or unmapped) add the edge's
 * transfer cost.
 */
pub fn ready_time(workflow: &Workflow, bags: &HashMap<JobId, HeftBag>, job: &JobId, site: Option<&SiteName>, cost_model: &CostModel) -> f64 {
    workflow
        .graph
        .parents(job)
        .iter()
        .map(|parent| {
            let bag = bags.get(parent);
            let finish = bag.map(|bag| bag.actual_finish_time).unwrap_or(0.0);
            let same_site = site.is_some() && bag.and_then(|bag| bag.site.as_ref()) == site;
            if same_site { finish } else { finish + cost_model.transfer_cost(workflow, parent, job) }
        })
        .fold(0.0, f64::max)
}

/**
 * Places `job` on `site` at the earliest possible time and records the outcome in its bag.
 *
 * Shared by the selectors that choose the site up front and only need the simulated timing.
 */
pub fn place_on_site(
    workflow: &mut Workflow,
    bags: &mut HashMap<JobId, HeftBag>,
    pool: &mut SitePool,
    job_id: &JobId,
    site: &SiteName,
    cost_model: &CostModel,
) -> Result<(), StageError> {
    let ready = ready_time(workflow, bags, job_id, Some(site), cost_model);
    let runtime = workflow.job(job_id).map(|job| cost_model.runtime_on(job, site)).unwrap_or(0.0);

    let simulated_site = pool.site_mut(site)?;
    let start = simulated_site.available_time(ready);
    let finish = start + runtime;
    simulated_site.schedule_job(start, finish)?;

    record_placement(workflow, bags, job_id, site, start, finish);
    Ok(())
}

/// Writes a committed placement into the job's bag and onto the job itself.
pub fn record_placement(workflow: &mut Workflow, bags: &mut HashMap<JobId, HeftBag>, job_id: &JobId, site: &SiteName, start: f64, finish: f64) {
    let bag = bags.entry(job_id.clone()).or_default();
    bag.actual_start_time = start;
    bag.actual_finish_time = finish;
    bag.site = Some(site.clone());

    if let Some(job) = workflow.job_mut(job_id) {
        job.site = Some(site.clone());
    }
    log::debug!("Job {} mapped to site {} [{}, {}].", job_id, site, start, finish);
}

/// Records a job no candidate site exists for: it keeps the `NONE` site and takes no time.
pub fn leave_unmapped(workflow: &Workflow, bags: &mut HashMap<JobId, HeftBag>, job_id: &JobId, cost_model: &CostModel) -> NoCandidateSiteWarning {
    let ready = ready_time(workflow, bags, job_id, None, cost_model);
    let bag = bags.entry(job_id.clone()).or_default();
    bag.actual_start_time = ready;
    bag.actual_finish_time = ready;
    bag.site = None;

    let transformation = workflow.job(job_id).map(|job| job.transformation.clone()).unwrap_or_else(|| job_id.id.as_str().into());
    let warning = NoCandidateSiteWarning { job: job_id.clone(), transformation };
    log::warn!("{}", warning);
    warning
}
