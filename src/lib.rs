pub mod config;
pub mod engine;
pub mod extractors;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;
pub mod validation;
