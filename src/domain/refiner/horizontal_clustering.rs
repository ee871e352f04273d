use std::collections::{BTreeMap, HashMap};

use crate::domain::refiner::clustering::{Clusterer, merge_jobs};
use crate::domain::utils::id::{JobId, SiteName, TransformationName};
use crate::domain::workflow::workflow::Workflow;
use crate::error::StageError;

/**
 * Horizontal clustering.
 *
 * Compute jobs on the same level of the workflow (longest path from a root), running the same
 * transformation on the same site are merged in chunks of `cluster_size`. Jobs of one level are
 * never connected to each other, so merging them cannot close a cycle. Members of a chunk run
 * side by side, the clustered job takes as long as its longest member.
 */
#[derive(Debug)]
pub struct HorizontalClusterer {
    cluster_size: usize,
}

impl HorizontalClusterer {
    pub fn new(cluster_size: usize) -> Self {
        HorizontalClusterer { cluster_size }
    }

    fn levels(workflow: &Workflow) -> Result<HashMap<JobId, usize>, StageError> {
        let mut levels: HashMap<JobId, usize> = HashMap::new();
        for id in workflow.graph.topological_order()? {
            let level = workflow.graph.parents(&id).iter().filter_map(|parent| levels.get(parent)).map(|level| level + 1).max().unwrap_or(0);
            levels.insert(id, level);
        }
        Ok(levels)
    }
}

impl Clusterer for HorizontalClusterer {
    fn description(&self) -> String {
        format!("Horizontal clustering (size {})", self.cluster_size)
    }

    fn cluster(&self, workflow: &mut Workflow) -> Result<Vec<JobId>, StageError> {
        if self.cluster_size < 2 {
            log::debug!("Horizontal cluster size {} leaves every job on its own.", self.cluster_size);
            return Ok(Vec::new());
        }

        let levels = Self::levels(workflow)?;
        let mut buckets: BTreeMap<(usize, TransformationName, SiteName), Vec<JobId>> = BTreeMap::new();
        for job in workflow.jobs().filter(|job| job.job_type.is_compute()) {
            let (Some(site), Some(level)) = (job.site.clone(), levels.get(&job.id)) else {
                continue;
            };
            buckets.entry((*level, job.transformation.clone(), site)).or_default().push(job.id.clone());
        }

        let mut clusters = Vec::new();
        for ((level, transformation, site), mut members) in buckets {
            members.sort();
            for (chunk_index, chunk) in members.chunks(self.cluster_size).enumerate() {
                if chunk.len() < 2 {
                    continue;
                }
                let runtime = chunk.iter().filter_map(|id| workflow.job(id)).map(|job| job.runtime).fold(0.0, f64::max);
                let cluster_id = JobId::new(format!("merge_{}_{}_{}_{}", transformation, site, level, chunk_index));
                merge_jobs(workflow, chunk, cluster_id.clone(), runtime)?;
                clusters.push(cluster_id);
            }
        }
        Ok(clusters)
    }
}
