// Library exports for Quotarium
// This allows integration tests and external code to use Quotarium modules

pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod history;
pub mod quotes;
pub mod routes;
pub mod state;
pub mod votes;
