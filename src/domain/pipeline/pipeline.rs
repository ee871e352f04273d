use std::time::Instant;

use crate::domain::catalog::site_catalog::SiteEntry;
use crate::domain::graph::cycle_checker::CycleChecker;
use crate::domain::pipeline::context::PlannerContext;
use crate::domain::pipeline::stage::{Stage, StageReport, StageWarning};
use crate::domain::refiner::cleanup::{CleanupMode, add_inplace_cleanup, build_cleanup_workflow};
use crate::domain::refiner::clustering::ClusteringType;
use crate::domain::refiner::create_dir::add_create_dir_jobs;
use crate::domain::refiner::data_reuse::DataReuseEngine;
use crate::domain::refiner::transfer::TransferEngine;
use crate::domain::scheduler::cost_model::CostModel;
use crate::domain::scheduler::site_selector::ScheduleSummary;
use crate::domain::scheduler::site_selector_type::SiteSelectorType;
use crate::domain::utils::id::{JobId, SiteName};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result, StageError};

/// Outcome of a successful planning run.
#[derive(Debug, Clone)]
pub struct PlannedWorkflow {
    pub workflow: Workflow,

    /// Only built with the `separate` cleanup mode.
    pub cleanup_workflow: Option<Workflow>,
    pub schedule: ScheduleSummary,
    pub authenticated_sites: Vec<SiteName>,
    pub deleted_jobs: Vec<JobId>,
    pub reports: Vec<StageReport>,
}

/**
 * Runs the refinement stages over one workflow:
 *
 * Authenticate -> Reduce -> SiteSelect -> Cluster -> InsertTransferNodes -> CreateDirectories -> Cleanup
 *
 * Every stage mutates the same workflow in place. The first fatal error aborts the run and is
 * returned as `Error::StageFailed`, no partially refined workflow is handed out.
 */
#[derive(Debug)]
pub struct RefinementPipeline<'a> {
    context: &'a PlannerContext,
}

impl<'a> RefinementPipeline<'a> {
    pub fn new(context: &'a PlannerContext) -> Self {
        RefinementPipeline { context }
    }

    pub fn run(&self, workflow: Workflow) -> Result<PlannedWorkflow> {
        let mut workflow = workflow;
        let mut reports = Vec::new();
        log::info!("Planning workflow '{}' ({} jobs), run {}.", workflow.label, workflow.len(), self.context.run_id);

        let sites = self.stage(Stage::Authenticate, &mut workflow, &mut reports, |_, report| self.authenticate(report))?;
        let deleted_jobs = self.stage(Stage::Reduce, &mut workflow, &mut reports, |workflow, report| self.reduce(workflow, report))?;
        let schedule = self.stage(Stage::SiteSelect, &mut workflow, &mut reports, |workflow, report| self.select_sites(workflow, &sites, report))?;
        self.stage(Stage::Cluster, &mut workflow, &mut reports, |workflow, report| self.cluster(workflow, report))?;
        self.stage(Stage::InsertTransferNodes, &mut workflow, &mut reports, |workflow, _| self.insert_transfer_nodes(workflow))?;
        self.stage(Stage::CreateDirectories, &mut workflow, &mut reports, |workflow, report| self.create_directories(workflow, report))?;
        let cleanup_workflow = self.stage(Stage::Cleanup, &mut workflow, &mut reports, |workflow, report| self.cleanup(workflow, report))?;

        // Merges and transfer insertion rewire edges; the handed out workflow must stay acyclic.
        workflow.graph.check_acyclic().map_err(|error| Error::stage_failed(Stage::Cleanup, error))?;

        log::info!("Workflow '{}' planned: {} jobs, makespan {}.", workflow.label, workflow.len(), schedule.makespan);
        Ok(PlannedWorkflow {
            workflow,
            cleanup_workflow,
            schedule,
            authenticated_sites: sites.into_iter().map(|site| site.name).collect(),
            deleted_jobs,
            reports,
        })
    }

    /// Runs one stage, records its report and wraps a failure with the stage it happened in.
    fn stage<T>(
        &self,
        stage: Stage,
        workflow: &mut Workflow,
        reports: &mut Vec<StageReport>,
        body: impl FnOnce(&mut Workflow, &mut StageReport) -> std::result::Result<T, StageError>,
    ) -> Result<T> {
        let started = Instant::now();
        log::info!("Stage {} started.", stage);

        let mut report = StageReport::new(stage, workflow.len());
        let outcome = body(workflow, &mut report);
        report.jobs_after = workflow.len();

        match outcome {
            Ok(value) => {
                report.log_summary();
                log::debug!("Stage {} took {} ms.", stage, started.elapsed().as_millis());
                reports.push(report);
                Ok(value)
            }
            Err(error) => {
                log::error!("Stage {} failed: {}", stage, error);
                Err(Error::stage_failed(stage, error))
            }
        }
    }

    fn authenticate(&self, report: &mut StageReport) -> std::result::Result<Vec<SiteEntry>, StageError> {
        let options = &self.context.options;
        let mut catalog_sites = self.context.site_catalog.list_sites();
        catalog_sites.sort_by(|a, b| a.name.cmp(&b.name));

        let candidates = if options.execution_sites.is_empty() {
            catalog_sites
        } else {
            let mut requested = Vec::with_capacity(options.execution_sites.len());
            for name in &options.execution_sites {
                let site = catalog_sites.iter().find(|site| &site.name == name).ok_or_else(|| StageError::UnknownSite(name.clone()))?;
                requested.push(site.clone());
            }
            requested
        };

        if !options.authenticate {
            report.skipped = true;
            if candidates.is_empty() {
                return Err(StageError::NoAuthenticatedSites { failures: Vec::new() });
            }
            return Ok(candidates);
        }

        let mut authenticated = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();
        for site in candidates {
            match self.context.authenticator.authenticate(&site) {
                Ok(()) => authenticated.push(site),
                Err(error) => {
                    log::warn!("{}", error);
                    report.warnings.push(StageWarning::SiteAuthentication(error.clone()));
                    failures.push(error);
                }
            }
        }

        if authenticated.is_empty() {
            return Err(StageError::NoAuthenticatedSites { failures });
        }
        log::info!("Authenticated sites: {}", authenticated.iter().map(|site| site.name.as_str()).collect::<Vec<_>>().join(", "));
        Ok(authenticated)
    }

    fn reduce(&self, workflow: &mut Workflow, report: &mut StageReport) -> std::result::Result<Vec<JobId>, StageError> {
        if self.context.options.force {
            report.skipped = true;
            return Ok(Vec::new());
        }
        Ok(DataReuseEngine::new(self.context.replica_catalog.as_ref()).reduce(workflow)?)
    }

    fn select_sites(&self, workflow: &mut Workflow, sites: &[SiteEntry], report: &mut StageReport) -> std::result::Result<ScheduleSummary, StageError> {
        let mut checker = CycleChecker::new(&workflow.graph);
        if checker.has_cycle() {
            return Err(checker.to_error().into());
        }

        let options = &self.context.options;
        let cost_model = CostModel::new(self.context.transformation_catalog.as_ref(), sites, options.average_communication_cost, options.default_processor_count);
        let mut selector = SiteSelectorType::get_instance(options.site_selector, options.random_seed);
        log::info!("Using {}.", selector.description());

        let selection = selector.map_workflow(workflow, &cost_model)?;
        report.warnings.extend(selection.warnings.iter().cloned().map(StageWarning::NoCandidateSite));

        let unmapped = workflow.unmapped_compute_jobs();
        if !unmapped.is_empty() {
            return Err(StageError::UnmappedJobs { jobs: unmapped });
        }
        Ok(selection.summary())
    }

    fn cluster(&self, workflow: &mut Workflow, report: &mut StageReport) -> std::result::Result<(), StageError> {
        let options = &self.context.options;
        if options.clustering.is_empty() {
            report.skipped = true;
            return Ok(());
        }

        for clustering in &options.clustering {
            let clusterer = ClusteringType::get_instance(*clustering, options.horizontal_cluster_size);
            let clusters = clusterer.cluster(workflow)?;
            log::info!("{} created {} clustered jobs.", clusterer.description(), clusters.len());
        }
        Ok(())
    }

    fn insert_transfer_nodes(&self, workflow: &mut Workflow) -> std::result::Result<(), StageError> {
        let engine = TransferEngine::new(self.context.replica_catalog.as_ref(), self.context.options.output_site.as_ref());
        engine.insert_transfer_nodes(workflow)?;
        Ok(())
    }

    fn create_directories(&self, workflow: &mut Workflow, report: &mut StageReport) -> std::result::Result<(), StageError> {
        if !self.context.options.create_directories {
            report.skipped = true;
            return Ok(());
        }
        add_create_dir_jobs(workflow, &self.context.run_id)?;
        Ok(())
    }

    fn cleanup(&self, workflow: &mut Workflow, report: &mut StageReport) -> std::result::Result<Option<Workflow>, StageError> {
        let output_site = self.context.options.output_site.as_ref();
        match self.context.options.cleanup {
            CleanupMode::None => {
                report.skipped = true;
                Ok(None)
            }
            CleanupMode::InPlace => {
                add_inplace_cleanup(workflow, output_site)?;
                Ok(None)
            }
            CleanupMode::Separate => Ok(Some(build_cleanup_workflow(workflow, output_site)?)),
        }
    }
}
