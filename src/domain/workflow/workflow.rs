use std::collections::BTreeSet;

use crate::api::workflow_dto::WorkflowDto;
use crate::domain::graph::graph::Graph;
use crate::domain::utils::id::{JobId, SiteName};
use crate::domain::workflow::dependency::Dependency;
use crate::domain::workflow::job::{FileRole, Job, WorkflowFile};
use crate::error::{Error, GraphError};

pub type WorkflowGraph = Graph<JobId, Job, Dependency>;

/// The workflow DAG refined by the pipeline: jobs as nodes, data/control dependencies as edges.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub label: String,
    pub graph: WorkflowGraph,
}

impl Workflow {
    pub fn new(label: impl Into<String>) -> Self {
        Workflow { label: label.into(), graph: Graph::new() }
    }

    /// Constructs the workflow graph from a WorkflowDto.
    ///
    /// Jobs are added first (in DTO order), then all dependencies. Unknown job references,
    /// duplicate job ids and self dependencies are reported as errors.
    pub fn from_dto(dto: WorkflowDto) -> Result<Self, Error> {
        let mut workflow = Workflow::new(dto.label);

        for job_dto in dto.jobs {
            let mut job = Job::new(job_dto.id, job_dto.transformation, job_dto.runtime);
            job.label = job_dto.label;
            job.execution_site_hint = job_dto.execution_site.map(SiteName::new);

            for file_dto in job_dto.files {
                let role: FileRole = file_dto.role.parse()?;
                let file = match role {
                    FileRole::Input => WorkflowFile::input(file_dto.lfn),
                    FileRole::Output => WorkflowFile::output(file_dto.lfn),
                };
                job.files.push(file.with_transfer(file_dto.transfer));
            }
            workflow.add_job(job)?;
        }

        for dep_dto in dto.dependencies {
            let dependency = Dependency { transfer_cost: dep_dto.transfer_cost };
            workflow.add_dependency(&JobId::new(dep_dto.parent), &JobId::new(dep_dto.child), dependency)?;
        }

        log::debug!("Workflow '{}' built with {} jobs and {} dependencies.", workflow.label, workflow.len(), workflow.graph.edge_count());
        Ok(workflow)
    }

    pub fn add_job(&mut self, job: Job) -> Result<(), GraphError> {
        self.graph.add_node(job.id.clone(), job)
    }

    pub fn add_dependency(&mut self, parent: &JobId, child: &JobId, dependency: Dependency) -> Result<bool, GraphError> {
        self.graph.add_edge(parent, child, dependency)
    }

    pub fn job(&self, id: &JobId) -> Option<&Job> {
        self.graph.content(id)
    }

    pub fn job_mut(&mut self, id: &JobId) -> Option<&mut Job> {
        self.graph.content_mut(id)
    }

    /// Jobs in insertion order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.graph.nodes().map(|node| &node.content)
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.graph.node_ids().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// All sites jobs are currently mapped to.
    pub fn used_sites(&self) -> BTreeSet<SiteName> {
        self.jobs().filter_map(|job| job.site.clone()).collect()
    }

    /// Compute jobs still carrying the `NONE` site.
    pub fn unmapped_compute_jobs(&self) -> Vec<JobId> {
        self.jobs().filter(|job| job.job_type.is_compute() && !job.is_mapped()).map(|job| job.id.clone()).collect()
    }

    pub fn print_summary(&self) {
        log::info!("Workflow '{}': {} jobs, {} dependencies", self.label, self.len(), self.graph.edge_count());
        for job in self.jobs() {
            log::info!("  {} [{}] -> {} (parents: {})", job.id, job.job_type, job.site_handle(), self.graph.parents(&job.id).len());
        }
    }
}
