//! BDD step definitions for court dashboard

pub mod backend_steps;
pub mod cancel_steps;
pub mod dashboard_steps;
pub mod query_steps;
