//! HTTP API handlers for codeshift-server

pub mod analyses;
pub mod files;
pub mod health;
pub mod migration;
pub mod projects;
pub mod sse;

pub use analyses::analysis_routes;
pub use files::file_routes;
pub use health::health_routes;
pub use migration::migration_routes;
pub use projects::project_routes;
pub use sse::event_stream;
