pub mod cycle_checker;
pub mod graph;

mod graph_tests;
