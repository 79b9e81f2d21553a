//! Service layer
//!
//! Business rules shared by the HTTP handlers; storage is reached only
//! through the repository traits so tests can swap in doubles.

pub mod auth_service;
pub mod redirect_service;
pub mod slug;
pub mod url_service;
pub mod visit_service;

pub use auth_service::{AuthResponse, AuthService, UserView};
pub use redirect_service::{RedirectResolver, VisitorInfo};
pub use slug::{SlugResolver, SlugSource, ThreadRngSlugSource};
pub use url_service::{CreateUrlRequest, UpdateUrlRequest, UrlService};
pub use visit_service::VisitService;
