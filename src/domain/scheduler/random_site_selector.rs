use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::graph::cycle_checker::CycleChecker;
use crate::domain::scheduler::cost_model::CostModel;
use crate::domain::scheduler::site_selector::{SiteSelection, SiteSelector, build_site_pool, leave_unmapped, place_on_site};
use crate::domain::workflow::workflow::Workflow;
use crate::error::StageError;

/// Picks one of a job's candidate sites uniformly at random. Seeded, so runs are reproducible.
#[derive(Debug)]
pub struct RandomSiteSelector {
    rng: StdRng,
}

impl RandomSiteSelector {
    pub fn new(seed: u64) -> Box<dyn SiteSelector> {
        Box::new(RandomSiteSelector { rng: StdRng::seed_from_u64(seed) })
    }
}

impl SiteSelector for RandomSiteSelector {
    fn description(&self) -> String {
        "Random site selector".to_string()
    }

    fn map_workflow(&mut self, workflow: &mut Workflow, cost_model: &CostModel) -> Result<SiteSelection, StageError> {
        let order = workflow.graph.topological_order().map_err(|_| {
            let mut checker = CycleChecker::new(&workflow.graph);
            checker.has_cycle();
            checker.to_error()
        })?;

        let mut bags = HashMap::with_capacity(order.len());
        let mut pool = build_site_pool(cost_model);
        let mut warnings = Vec::new();

        for job_id in &order {
            let candidates = match workflow.job(job_id) {
                Some(job) => cost_model.candidate_sites(job),
                None => continue,
            };
            if candidates.is_empty() {
                warnings.push(leave_unmapped(workflow, &mut bags, job_id, cost_model));
                continue;
            }

            let site = candidates[self.rng.random_range(0..candidates.len())].name.clone();
            place_on_site(workflow, &mut bags, &mut pool, job_id, &site, cost_model)?;
        }

        Ok(SiteSelection { order, bags, sinks: workflow.graph.leaves(), warnings })
    }
}
