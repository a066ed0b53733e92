// Library exports for testing and external use

pub mod app;
pub mod auth;
pub mod dto;
pub mod middleware;
pub mod routes;
pub mod telemetry;
