//! Relational catalog backed by sea-orm with logical (soft) deletes.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{BookStore, StoreError, LIST_LIMIT};
use crate::modules::books::models::{Book, BookPatch, NewBook};

pub mod entity {
    use sea_orm::entity::prelude::*;

    /// Row shape of the `books` table. `deleted_at` is the soft-delete
    /// marker; a non-null value means the record is logically removed.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "books")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub author: String,
        pub title: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<entity::Model> for Book {
    fn from(row: entity::Model) -> Self {
        Book {
            id: row.id,
            author: row.author,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database-backed store. Every operation issues one statement, except
/// update/delete which read the row first (two round trips, not atomic).
#[derive(Clone)]
pub struct DbStore {
    conn: DatabaseConnection,
}

impl DbStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Query scoped to live rows only.
    fn live() -> sea_orm::Select<entity::Entity> {
        entity::Entity::find().filter(entity::Column::DeletedAt.is_null())
    }

    async fn fetch(&self, id: i64) -> Result<entity::Model, StoreError> {
        Self::live()
            .filter(entity::Column::Id.eq(id))
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl BookStore for DbStore {
    async fn create(&self, new: NewBook) -> Result<Book, StoreError> {
        let now = Utc::now();
        let row = entity::ActiveModel {
            author: Set(new.author),
            title: Set(new.title),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let stored = row.insert(&self.conn).await?;
        Ok(stored.into())
    }

    async fn get(&self, id: i64) -> Result<Book, StoreError> {
        Ok(self.fetch(id).await?.into())
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows = Self::live()
            .order_by_asc(entity::Column::Id)
            .limit(LIST_LIMIT)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn update(&self, id: i64, patch: BookPatch) -> Result<Book, StoreError> {
        let row = self.fetch(id).await?;

        let mut active = row.into_active_model();
        if let Some(author) = patch.author {
            active.author = Set(author);
        }
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.conn).await?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> Result<i64, StoreError> {
        let row = self.fetch(id).await?;

        let mut active = row.into_active_model();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&self.conn).await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, Schema};

    async fn store() -> DbStore {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        let backend = conn.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(entity::Entity);
        conn.execute(backend.build(&stmt)).await.unwrap();
        DbStore::new(conn)
    }

    fn sample(author: &str, title: &str) -> NewBook {
        NewBook {
            author: author.to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_round_trips() {
        let store = store().await;
        let created = store.create(sample("A", "T")).await.unwrap();
        assert!(created.id >= 1);

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched.author, "A");
        assert_eq!(fetched.title, "T");
    }

    #[tokio::test]
    async fn delete_is_logical_and_hides_the_row() {
        let store = store().await;
        let created = store.create(sample("A", "T")).await.unwrap();

        store.delete(created.id).await.unwrap();

        // Gone from the store's surface...
        assert!(matches!(
            store.get(created.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.list().await.unwrap().is_empty());

        // ...but the row itself is still there, marked removed.
        let raw = entity::Entity::find().all(&store.conn).await.unwrap();
        assert_eq!(raw.len(), 1);
        assert!(raw[0].deleted_at.is_some());
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reassigned() {
        let store = store().await;
        let first = store.create(sample("A", "T1")).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(sample("B", "T2")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let store = store().await;
        let created = store.create(sample("A", "T")).await.unwrap();

        assert_eq!(store.delete(created.id).await.unwrap(), created.id);
        assert!(matches!(
            store.delete(created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_replaces_only_supplied_fields() {
        let store = store().await;
        let created = store.create(sample("A", "T")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store
            .update(
                created.id,
                BookPatch {
                    author: Some("B2".to_string()),
                    title: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.author, "B2");
        assert_eq!(updated.title, "T");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn list_orders_by_id_and_caps_at_limit() {
        let store = store().await;
        for i in 0..(LIST_LIMIT + 5) {
            store.create(sample("A", &format!("T{i}"))).await.unwrap();
        }

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), LIST_LIMIT as usize);
        assert!(listed.windows(2).all(|pair| pair[0].id < pair[1].id));
    }
}
