use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::domain::refiner::horizontal_clustering::HorizontalClusterer;
use crate::domain::refiner::label_clustering::LabelClusterer;
use crate::domain::utils::id::{JobId, Lfn};
use crate::domain::workflow::dependency::Dependency;
use crate::domain::workflow::job::{Job, WorkflowFile};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{ConversionError, StageError};

/// Merges groups of mapped jobs into clustered jobs to reduce per-job overhead.
pub trait Clusterer: fmt::Debug {
    fn description(&self) -> String;

    /// Returns the ids of the clustered jobs that were created.
    fn cluster(&self, workflow: &mut Workflow) -> Result<Vec<JobId>, StageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusteringType {
    /// Jobs carrying the same label on the same site.
    Label,
    /// Jobs on the same level with the same transformation on the same site.
    Horizontal,
}

impl ClusteringType {
    /// Factory method to return a concrete instance of a [`Clusterer`] based on the enum variant.
    pub fn get_instance(clustering_type: ClusteringType, horizontal_cluster_size: usize) -> Box<dyn Clusterer> {
        match clustering_type {
            ClusteringType::Label => Box::new(LabelClusterer),
            ClusteringType::Horizontal => Box::new(HorizontalClusterer::new(horizontal_cluster_size)),
        }
    }
}

impl FromStr for ClusteringType {
    type Err = ConversionError;

    fn from_str(clustering: &str) -> Result<ClusteringType, Self::Err> {
        match clustering.to_ascii_lowercase().as_str() {
            "label" => Ok(ClusteringType::Label),
            "horizontal" => Ok(ClusteringType::Horizontal),
            _ => Err(ConversionError::UnknownClustering(clustering.to_string())),
        }
    }
}

impl fmt::Display for ClusteringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusteringType::Label => write!(f, "label"),
            ClusteringType::Horizontal => write!(f, "horizontal"),
        }
    }
}

/**
 * Replaces `members` by one clustered job with id `cluster_id`.
 *
 * The clustered job reads every member input not produced inside the cluster and writes every
 * member output. Edges between members are dropped, edges to and from the outside are moved to
 * the clustered job. All members must be mapped to the same site.
 */
pub fn merge_jobs(workflow: &mut Workflow, members: &[JobId], cluster_id: JobId, runtime: f64) -> Result<(), StageError> {
    let member_set: HashSet<&JobId> = members.iter().collect();
    let jobs: Vec<Job> = members.iter().filter_map(|id| workflow.job(id).cloned()).collect();
    let Some(first) = jobs.first() else {
        return Ok(());
    };

    let transformation = if jobs.iter().all(|job| job.transformation == first.transformation) {
        first.transformation.clone()
    } else {
        "planner::cluster".into()
    };
    let mut cluster = Job::new(cluster_id.id.clone(), transformation.id, runtime);
    cluster.site = first.site.clone();
    cluster.label = first.label.clone();
    cluster.execution_site_hint = first.execution_site_hint.clone();

    let produced: BTreeSet<&Lfn> = jobs.iter().flat_map(|job| job.output_files().map(|file| &file.lfn)).collect();
    let mut seen: HashSet<(Lfn, bool)> = HashSet::new();
    for job in &jobs {
        for file in job.input_files().filter(|file| !produced.contains(&file.lfn)).chain(job.output_files()) {
            if seen.insert((file.lfn.clone(), file.is_input())) {
                cluster.files.push(file.clone());
            }
        }
        if job.clustered_jobs.is_empty() {
            cluster.clustered_jobs.push(job.id.clone());
        } else {
            cluster.clustered_jobs.extend(job.clustered_jobs.iter().cloned());
        }
    }
    merge_transfer_flags(&mut cluster.files, &jobs);

    let mut incoming: Vec<(JobId, Dependency)> = Vec::new();
    let mut outgoing: Vec<(JobId, Dependency)> = Vec::new();
    for member in members {
        for parent in workflow.graph.parents(member).iter().filter(|parent| !member_set.contains(parent)) {
            incoming.push((parent.clone(), workflow.graph.edge(parent, member).copied().unwrap_or_default()));
        }
        for child in workflow.graph.children(member).iter().filter(|child| !member_set.contains(child)) {
            outgoing.push((child.clone(), workflow.graph.edge(member, child).copied().unwrap_or_default()));
        }
    }

    for member in members {
        workflow.graph.remove_node(member);
    }
    workflow.add_job(cluster)?;
    for (parent, dependency) in incoming {
        workflow.add_dependency(&parent, &cluster_id, dependency)?;
    }
    for (child, dependency) in outgoing {
        workflow.add_dependency(&cluster_id, &child, dependency)?;
    }

    log::debug!("Clustered {} jobs into {}.", members.len(), cluster_id);
    Ok(())
}

/// A merged file needs a transfer as soon as one of the members asked for it.
fn merge_transfer_flags(files: &mut [WorkflowFile], jobs: &[Job]) {
    for file in files.iter_mut() {
        file.transfer = jobs.iter().flat_map(|job| job.files.iter()).any(|other| other.lfn == file.lfn && other.role == file.role && other.transfer);
    }
}
