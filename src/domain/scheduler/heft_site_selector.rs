use std::collections::{HashMap, HashSet};

use crate::domain::graph::cycle_checker::CycleChecker;
use crate::domain::scheduler::cost_model::CostModel;
use crate::domain::scheduler::heft_bag::HeftBag;
use crate::domain::scheduler::rank_calculator::Ranks;
use crate::domain::scheduler::site::SitePool;
use crate::domain::scheduler::site_selector::{SiteSelection, SiteSelector, build_site_pool, leave_unmapped, ready_time, record_placement};
use crate::domain::utils::id::{JobId, SiteName};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{CyclicWorkflowError, StageError};

/**
 * Site selector using the HEFT (Heterogeneous Earliest Finish Time) list scheduling algorithm.
 *
 * Jobs are ranked by the length of their critical path to the exit of the workflow assuming
 * average sites and average links (upward rank). Taken in descending rank order, every job is
 * placed on the candidate site that offers the earliest finish time. Processors are simulated
 * without insertion, a job always starts after the last job of its processor.
 */
#[derive(Debug, Default)]
pub struct HeftSiteSelector;

impl HeftSiteSelector {
    pub fn new() -> Box<dyn SiteSelector> {
        Box::new(HeftSiteSelector)
    }

    fn compute_bags(workflow: &Workflow, cost_model: &CostModel) -> Result<HashMap<JobId, HeftBag>, CyclicWorkflowError> {
        let mut bags: HashMap<JobId, HeftBag> = workflow.jobs().map(|job| (job.id.clone(), HeftBag::new(cost_model.average_compute_cost(job)))).collect();

        let ranks = Ranks::compute(
            &workflow.graph,
            |id| bags.get(id).map(|bag| bag.average_compute_time).unwrap_or(0.0),
            |parent, child| cost_model.communication_cost(workflow, parent, child),
        )?;

        for (id, bag) in bags.iter_mut() {
            bag.upward_rank = ranks.upward_rank(id);
            bag.downward_rank = ranks.downward_rank(id);
        }
        Ok(bags)
    }

    /// Jobs by descending upward rank (ties by id). With zero costs a child may tie with its
    /// parent, so the first job whose parents are all placed is taken next.
    fn scheduling_order(workflow: &Workflow, bags: &HashMap<JobId, HeftBag>) -> Result<Vec<JobId>, CyclicWorkflowError> {
        let ranks = Ranks { upward: bags.iter().map(|(id, bag)| (id.clone(), bag.upward_rank)).collect(), downward: HashMap::new() };
        let mut pending = ranks.by_descending_upward_rank();

        let mut placed: HashSet<JobId> = HashSet::with_capacity(pending.len());
        let mut order = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let next = pending
                .iter()
                .position(|id| workflow.graph.parents(id).iter().all(|parent| placed.contains(parent)))
                .ok_or_else(|| {
                    let mut checker = CycleChecker::new(&workflow.graph);
                    checker.has_cycle();
                    checker.to_error()
                })?;
            let id = pending.remove(next);
            placed.insert(id.clone());
            order.push(id);
        }
        Ok(order)
    }

    /// Probes every candidate site and commits the one with the earliest finish time.
    fn schedule_job(
        workflow: &mut Workflow,
        bags: &mut HashMap<JobId, HeftBag>,
        pool: &mut SitePool,
        job_id: &JobId,
        cost_model: &CostModel,
    ) -> Result<Option<SiteName>, StageError> {
        let Some(job) = workflow.job(job_id) else {
            return Ok(None);
        };

        let mut best: Option<(f64, f64, SiteName)> = None;
        for candidate in cost_model.candidate_sites(job) {
            let ready = ready_time(workflow, bags, job_id, Some(&candidate.name), cost_model);
            let start = pool.site_mut(&candidate.name)?.available_time(ready);
            let finish = start + cost_model.runtime_on(job, &candidate.name);
            log::trace!("Job {} on site {}: ready {}, start {}, finish {}", job_id, candidate.name, ready, start, finish);

            let is_better = match &best {
                None => true,
                Some((best_finish, _, best_site)) => finish < *best_finish || (finish == *best_finish && candidate.name < *best_site),
            };
            if is_better {
                best = Some((finish, start, candidate.name.clone()));
            }
        }

        let Some((finish, start, site)) = best else {
            return Ok(None);
        };
        pool.site_mut(&site)?.schedule_job(start, finish)?;
        record_placement(workflow, bags, job_id, &site, start, finish);
        Ok(Some(site))
    }
}

impl SiteSelector for HeftSiteSelector {
    fn description(&self) -> String {
        "HEFT based site selector".to_string()
    }

    fn map_workflow(&mut self, workflow: &mut Workflow, cost_model: &CostModel) -> Result<SiteSelection, StageError> {
        let mut checker = CycleChecker::new(&workflow.graph);
        if checker.has_cycle() {
            return Err(checker.to_error().into());
        }

        let mut bags = Self::compute_bags(workflow, cost_model)?;
        let order = Self::scheduling_order(workflow, &bags)?;
        let mut pool = build_site_pool(cost_model);
        let mut warnings = Vec::new();

        for job_id in &order {
            if Self::schedule_job(workflow, &mut bags, &mut pool, job_id, cost_model)?.is_none() {
                warnings.push(leave_unmapped(workflow, &mut bags, job_id, cost_model));
            }
        }

        let selection = SiteSelection { order, bags, sinks: workflow.graph.leaves(), warnings };
        log::info!("HEFT mapped {} jobs, makespan {}.", selection.order.len() - selection.warnings.len(), selection.makespan());
        Ok(selection)
    }
}
