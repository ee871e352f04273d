pub mod catalog_dto;
pub mod options_dto;
pub mod workflow_dto;
