use crate::domain::catalog::site_catalog::SiteEntry;
use crate::domain::catalog::transformation_catalog::TransformationCatalog;
use crate::domain::utils::id::{JobId, SiteName};
use crate::domain::workflow::job::Job;
use crate::domain::workflow::workflow::Workflow;

/// Average bandwidth between two sites in MB/s.
pub const AVERAGE_BANDWIDTH: f64 = 5.0;

/// Average size of a file transferred between two jobs in MB.
pub const AVERAGE_DATA_SIZE: f64 = 2.0;

pub const DEFAULT_AVERAGE_COMMUNICATION_COST: f64 = AVERAGE_BANDWIDTH / AVERAGE_DATA_SIZE;

/// Used for sites that do not report their number of free processors.
pub const DEFAULT_PROCESSOR_COUNT: usize = 10;

/**
 * Cost oracle of the site selectors.
 *
 * Knows the authenticated candidate sites and the transformation catalog and answers how long a
 * job runs on a site, how long it runs on an average site and how long a data dependency takes
 * on an average link.
 */
#[derive(Debug)]
pub struct CostModel<'a> {
    transformation_catalog: &'a dyn TransformationCatalog,
    sites: &'a [SiteEntry],
    average_communication_cost: f64,
    default_processor_count: usize,
}

impl<'a> CostModel<'a> {
    pub fn new(
        transformation_catalog: &'a dyn TransformationCatalog,
        sites: &'a [SiteEntry],
        average_communication_cost: f64,
        default_processor_count: usize,
    ) -> Self {
        CostModel { transformation_catalog, sites, average_communication_cost, default_processor_count }
    }

    pub fn sites(&self) -> &'a [SiteEntry] {
        self.sites
    }

    /// Number of processors simulated for `site`; never below one.
    pub fn processor_count(&self, site: &SiteEntry) -> usize {
        site.processors.unwrap_or(self.default_processor_count).max(1)
    }

    /// Authenticated sites the job may run on: the transformation has to be installed there, and
    /// an execution site hint restricts the choice to that one site.
    pub fn candidate_sites(&self, job: &Job) -> Vec<&'a SiteEntry> {
        self.sites
            .iter()
            .filter(|site| job.execution_site_hint.as_ref().is_none_or(|hint| hint == &site.name))
            .filter(|site| self.transformation_catalog.lookup(&job.transformation, &site.name).is_some())
            .collect()
    }

    /// Runtime of `job` on `site`: the catalog's per-site estimate, else the job's own estimate.
    pub fn runtime_on(&self, job: &Job, site: &SiteName) -> f64 {
        self.transformation_catalog.lookup(&job.transformation, site).and_then(|entry| entry.runtime).unwrap_or(job.runtime)
    }

    /// Processor weighted mean runtime of `job` over all sites it can run on.
    pub fn average_compute_cost(&self, job: &Job) -> f64 {
        let mut weighted_runtime = 0.0;
        let mut total_processors = 0usize;

        for site in self.candidate_sites(job) {
            let processors = self.processor_count(site);
            weighted_runtime += self.runtime_on(job, &site.name) * processors as f64;
            total_processors += processors;
        }

        if total_processors == 0 {
            return job.runtime;
        }
        weighted_runtime / total_processors as f64
    }

    /// Estimated communication cost of the edge `parent -> child`, used for ranking.
    ///
    /// Zero if both jobs are pinned to the same site, otherwise the edge's annotated cost or the
    /// configured average.
    pub fn communication_cost(&self, workflow: &Workflow, parent: &JobId, child: &JobId) -> f64 {
        let pinned_site = |id: &JobId| workflow.job(id).and_then(|job| job.execution_site_hint.clone());
        if let (Some(parent_site), Some(child_site)) = (pinned_site(parent), pinned_site(child)) {
            if parent_site == child_site {
                return 0.0;
            }
        }
        self.transfer_cost(workflow, parent, child)
    }

    /// Cost of moving the data of `parent -> child` between two different sites.
    pub fn transfer_cost(&self, workflow: &Workflow, parent: &JobId, child: &JobId) -> f64 {
        workflow.graph.edge(parent, child).and_then(|dependency| dependency.transfer_cost).unwrap_or(self.average_communication_cost)
    }
}
