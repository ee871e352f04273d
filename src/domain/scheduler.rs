pub mod cost_model;
pub mod heft_bag;
pub mod heft_site_selector;
mod heft_tests;
pub mod random_site_selector;
pub mod rank_calculator;
pub mod round_robin_site_selector;
pub mod site;
pub mod site_selector;
pub mod site_selector_type;
