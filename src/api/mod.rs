//! HTTP layer: routes, middleware and token handling

pub mod jwt;
pub mod middleware;
pub mod services;
