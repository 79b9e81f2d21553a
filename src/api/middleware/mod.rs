pub mod auth;
pub mod timing;

pub use auth::{AuthenticatedUser, RequireUser};
pub use timing::TimingMiddleware;
