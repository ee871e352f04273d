pub mod context;
pub mod options;
pub mod pipeline;
pub mod stage;
