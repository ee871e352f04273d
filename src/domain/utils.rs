pub mod id;
pub mod schedule_report;
