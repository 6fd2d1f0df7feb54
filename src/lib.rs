// Library root: the evaluation core and its collaborators, shared by the CLI
// and the integration tests.

pub mod cohort;
pub mod config;
pub mod evaluate;
pub mod models;
pub mod plan;
pub mod query;
pub mod render;
pub mod report;
pub mod roster;
