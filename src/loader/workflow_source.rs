use crate::api::catalog_dto::{ReplicaCatalogDto, SiteCatalogDto, TransformationCatalogDto};
use crate::api::options_dto::PlannerOptionsDto;
use crate::api::workflow_dto::WorkflowDto;
use crate::domain::catalog::replica_catalog::InMemoryReplicaCatalog;
use crate::domain::catalog::site_catalog::InMemorySiteCatalog;
use crate::domain::catalog::transformation_catalog::InMemoryTransformationCatalog;
use crate::domain::pipeline::options::PlannerOptions;
use crate::domain::workflow::workflow::Workflow;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

/// Produces the abstract workflow a planning run starts from.
pub trait WorkflowSource {
    fn parse_workflow(&self) -> Result<Workflow>;
}

/// Reads a workflow from a JSON file in the `WorkflowDto` format.
#[derive(Debug, Clone)]
pub struct JsonWorkflowSource {
    file_path: String,
}

impl JsonWorkflowSource {
    pub fn new(file_path: impl Into<String>) -> Self {
        JsonWorkflowSource { file_path: file_path.into() }
    }
}

impl WorkflowSource for JsonWorkflowSource {
    fn parse_workflow(&self) -> Result<Workflow> {
        let dto: WorkflowDto = parse_json_file(&self.file_path)?;
        log::info!("Workflow file '{}' parsed successfully.", self.file_path);
        Workflow::from_dto(dto)
    }
}

pub fn load_site_catalog(file_path: &str) -> Result<InMemorySiteCatalog> {
    let dto: SiteCatalogDto = parse_json_file(file_path)?;
    Ok(InMemorySiteCatalog::from_dto(dto))
}

pub fn load_replica_catalog(file_path: &str) -> Result<InMemoryReplicaCatalog> {
    let dto: ReplicaCatalogDto = parse_json_file(file_path)?;
    Ok(InMemoryReplicaCatalog::from_dto(dto))
}

pub fn load_transformation_catalog(file_path: &str) -> Result<InMemoryTransformationCatalog> {
    let dto: TransformationCatalogDto = parse_json_file(file_path)?;
    Ok(InMemoryTransformationCatalog::from_dto(dto))
}

pub fn load_options(file_path: &str) -> Result<PlannerOptions> {
    let dto: PlannerOptionsDto = parse_json_file(file_path)?;
    Ok(PlannerOptions::try_from(dto)?)
}
