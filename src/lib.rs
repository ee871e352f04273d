use crate::domain::pipeline::context::PlannerContext;
use crate::domain::pipeline::options::PlannerOptions;
use crate::domain::pipeline::pipeline::{PlannedWorkflow, RefinementPipeline};
use crate::domain::catalog::replica_catalog::InMemoryReplicaCatalog;
use crate::domain::catalog::transformation_catalog::InMemoryTransformationCatalog;
use crate::error::Result;
use crate::loader::workflow_source::{JsonWorkflowSource, WorkflowSource, load_options, load_replica_catalog, load_site_catalog, load_transformation_catalog};

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Paths of the JSON inputs of one planning run. Catalogs and options left out are empty/default.
#[derive(Debug, Clone, Default)]
pub struct PlannerInputs {
    pub workflow: String,
    pub sites: String,
    pub replicas: Option<String>,
    pub transformations: Option<String>,
    pub options: Option<String>,
}

/// Loads all inputs, builds the planner context and runs the refinement pipeline.
pub fn plan_workflow(inputs: &PlannerInputs) -> Result<PlannedWorkflow> {
    let workflow = JsonWorkflowSource::new(inputs.workflow.as_str()).parse_workflow()?;
    let site_catalog = load_site_catalog(&inputs.sites)?;
    let replica_catalog = match &inputs.replicas {
        Some(path) => load_replica_catalog(path)?,
        None => InMemoryReplicaCatalog::new(),
    };
    let transformation_catalog = match &inputs.transformations {
        Some(path) => load_transformation_catalog(path)?,
        None => InMemoryTransformationCatalog::new(),
    };
    let options = match &inputs.options {
        Some(path) => load_options(path)?,
        None => PlannerOptions::default(),
    };
    log::info!("All planner inputs loaded.");

    let context = PlannerContext::new(options, Box::new(site_catalog), Box::new(replica_catalog), Box::new(transformation_catalog));
    RefinementPipeline::new(&context).run(workflow)
}
