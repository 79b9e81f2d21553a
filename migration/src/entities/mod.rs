pub mod url;
pub mod user;
pub mod visit;

pub use url::Entity as UrlEntity;
pub use user::Entity as UserEntity;
pub use visit::Entity as VisitEntity;
