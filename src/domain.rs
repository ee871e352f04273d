pub mod catalog;
pub mod graph;
pub mod pipeline;
pub mod refiner;
pub mod scheduler;
pub mod utils;
pub mod workflow;
