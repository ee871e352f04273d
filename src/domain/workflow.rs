pub mod dependency;
pub mod job;
pub mod workflow;
