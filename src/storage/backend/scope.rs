//! 归属谓词
//!
//! 读、改、删都通过同一个条件限定到记录所有者，
//! 不属于调用者的记录与不存在的记录在存储层表现一致。

use sea_orm::{ColumnTrait, Condition};

use migration::entities::url;

pub fn owned_by(id: i64, owner_id: i64) -> Condition {
    Condition::all()
        .add(url::Column::Id.eq(id))
        .add(url::Column::OwnerId.eq(owner_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn test_predicate_filters_on_id_and_owner() {
        let sql = url::Entity::find()
            .filter(owned_by(7, 42))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#""urls"."id" = 7"#), "{}", sql);
        assert!(sql.contains(r#""urls"."owner_id" = 42"#), "{}", sql);
    }
}
