use std::collections::HashMap;

use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::domain::graph::cycle_checker::CycleChecker;
use crate::domain::refiner::clustering::{Clusterer, merge_jobs};
use crate::domain::utils::id::{JobId, SiteName};
use crate::domain::workflow::workflow::Workflow;
use crate::error::StageError;

/**
 * Label based clustering.
 *
 * All compute jobs carrying the same label and mapped to the same site end up in one clustered
 * job `merge_<label>_<site>` whose runtime is the sum of its members (they run one after the
 * other). Labels may span unrelated parts of the workflow, so a merge can close a cycle; that
 * fails the stage.
 */
#[derive(Debug, Default)]
pub struct LabelClusterer;

impl LabelClusterer {
    fn groups(workflow: &Workflow) -> Vec<(String, SiteName, Vec<JobId>)> {
        let candidates: Vec<(&JobId, String, SiteName)> = workflow
            .jobs()
            .filter(|job| job.job_type.is_compute())
            .filter_map(|job| Some((&job.id, job.label.clone()?, job.site.clone()?)))
            .collect();

        let mut dsu = QuickUnionUf::<UnionBySize>::new(candidates.len());
        let mut first_with_key: HashMap<(&str, &SiteName), usize> = HashMap::new();
        for (index, (_, label, site)) in candidates.iter().enumerate() {
            let first = *first_with_key.entry((label.as_str(), site)).or_insert(index);
            dsu.union(first, index);
        }

        // Groups keep the order of their first member.
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<(String, SiteName, Vec<JobId>)> = Vec::new();
        for (index, (id, label, site)) in candidates.iter().enumerate() {
            let root = dsu.find(index);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push((label.clone(), site.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[group].2.push((*id).clone());
        }
        groups
    }
}

impl Clusterer for LabelClusterer {
    fn description(&self) -> String {
        "Label based clustering".to_string()
    }

    fn cluster(&self, workflow: &mut Workflow) -> Result<Vec<JobId>, StageError> {
        let mut clusters = Vec::new();

        for (label, site, members) in Self::groups(workflow) {
            if members.len() < 2 {
                continue;
            }
            let runtime = members.iter().filter_map(|id| workflow.job(id)).map(|job| job.runtime).sum();
            let cluster_id = JobId::new(format!("merge_{}_{}", label, site));
            merge_jobs(workflow, &members, cluster_id.clone(), runtime)?;
            clusters.push(cluster_id);
        }

        let mut checker = CycleChecker::new(&workflow.graph);
        if checker.has_cycle() {
            return Err(checker.to_error().into());
        }
        Ok(clusters)
    }
}
