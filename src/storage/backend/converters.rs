use crate::storage::models::{UrlRecord, User, VisitRecord};
use migration::entities::{url, user, visit};

pub fn url_model_to_record(model: url::Model) -> UrlRecord {
    UrlRecord {
        id: model.id,
        destination: model.destination,
        slug: model.slug,
        owner_id: model.owner_id,
        visit_count: model.visit_count.max(0),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn visit_model_to_record(model: visit::Model) -> VisitRecord {
    VisitRecord {
        id: model.id,
        url_id: model.url_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        referer: model.referer,
        visited_at: model.visited_at,
    }
}

pub fn user_model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}
