use std::collections::HashMap;

use crate::domain::graph::cycle_checker::CycleChecker;
use crate::domain::scheduler::cost_model::CostModel;
use crate::domain::scheduler::site_selector::{SiteSelection, SiteSelector, build_site_pool, leave_unmapped, place_on_site};
use crate::domain::workflow::workflow::Workflow;
use crate::error::StageError;

/// Hands out the candidate sites of the workflow's jobs in turn, in topological job order.
#[derive(Debug, Default)]
pub struct RoundRobinSiteSelector {
    next_site: usize,
}

impl RoundRobinSiteSelector {
    pub fn new() -> Box<dyn SiteSelector> {
        Box::new(RoundRobinSiteSelector::default())
    }
}

impl SiteSelector for RoundRobinSiteSelector {
    fn description(&self) -> String {
        "Round robin site selector".to_string()
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

            let site = candidates[self.next_site % candidates.len()].name.clone();
            self.next_site += 1;
            place_on_site(workflow, &mut bags, &mut pool, job_id, &site, cost_model)?;
        }

        Ok(SiteSelection { order, bags, sinks: workflow.graph.leaves(), warnings })
    }
}
