use async_trait::async_trait;
use log::{debug, error, info};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Schema, TransactionTrait,
};

use crate::error_handling::types::StorageError;
use crate::storage::db_entities::{self as sessions, ActiveModel, Column, Entity};
use crate::storage::session_filter::by_creator;
use crate::storage::storage_trait::SessionStore;
use crate::storage::types::{Session, SessionFilter};

const BACKEND: &str = "databasestore";

fn read_failed(operation: &'static str) -> impl FnOnce(DbErr) -> StorageError {
    move |e| {
        error!("{}: {} failed: {}", BACKEND, operation, e);
        StorageError::ReadFailed {
            backend: BACKEND,
            operation,
            reason: e.to_string(),
        }
    }
}

fn write_failed(operation: &'static str) -> impl FnOnce(DbErr) -> StorageError {
    move |e| {
        error!("{}: {} failed: {}", BACKEND, operation, e);
        StorageError::WriteFailed {
            backend: BACKEND,
            operation,
            reason: e.to_string(),
        }
    }
}

fn connection_failed(e: DbErr) -> StorageError {
    error!("{}: could not connect: {}", BACKEND, e);
    StorageError::ConnectionFailed {
        backend: BACKEND,
        reason: e.to_string(),
    }
}

/// Session store persisted through SeaORM.
///
/// The connection pool is long-lived and shared; the database itself provides
/// isolation, so there is no client-side locking and concurrent updates to one
/// ID are last-write-wins.
#[derive(Debug)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Connect to `url`, make sure the `sessions` table exists and verify that a
    /// transaction can be opened.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let db = Database::connect(url).await.map_err(connection_failed)?;
        Self::from_connection(db).await
    }

    pub async fn from_connection(db: DatabaseConnection) -> Result<Self, StorageError> {
        let backend = db.get_database_backend();
        let mut create = Schema::new(backend).create_table_from_entity(Entity);
        create.if_not_exists();
        db.execute(backend.build(&create))
            .await
            .map_err(connection_failed)?;

        // connectivity probe
        let txn = db.begin().await.map_err(connection_failed)?;
        txn.rollback().await.map_err(connection_failed)?;

        info!("DatabaseStorage initialized ({:?})", backend);
        Ok(Self { db })
    }

    async fn list(&self, filter: SessionFilter) -> Result<Vec<Session>, StorageError> {
        let mut query = Entity::find();
        if let Some(ref creator) = filter.created_by_id {
            query = query.filter(Column::CreatedById.eq(creator.as_str()));
        }
        let rows: Vec<sessions::Model> = query
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await
            .map_err(read_failed("list"))?;
        debug!("Loaded {} session(s) with {:?}", rows.len(), filter);
        Ok(rows.into_iter().map(Session::from).collect())
    }
}

#[async_trait]
impl SessionStore for DatabaseStorage {
    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        self.list(SessionFilter::default()).await
    }

    async fn list_sessions_created_by(
        &self,
        user_id: &str,
    ) -> Result<Vec<Session>, StorageError> {
        self.list(by_creator(user_id)).await
    }

    async fn get_session(&self, id: i64) -> Result<Session, StorageError> {
        Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(read_failed("get"))?
            .map(Session::from)
            .ok_or(StorageError::NotFound { backend: BACKEND, id })
    }

    async fn add_session(&self, session: &Session) -> Result<i64, StorageError> {
        let result = Entity::insert(ActiveModel::from_session(session, false))
            .exec(&self.db)
            .await
            .map_err(write_failed("put"))?;
        debug!("Added session {}", result.last_insert_id);
        Ok(result.last_insert_id)
    }

    async fn update_session(&self, session: &Session) -> Result<(), StorageError> {
        if !session.is_persisted() {
            return Err(StorageError::UnassignedId {
                backend: BACKEND,
                operation: "update_session",
            });
        }
        match ActiveModel::from_session(session, true).update(&self.db).await {
            Ok(_) => {
                debug!("Updated session {}", session.id);
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(StorageError::NotFound {
                backend: BACKEND,
                id: session.id,
            }),
            Err(e) => Err(write_failed("update")(e)),
        }
    }

    async fn delete_session(&self, id: i64) -> Result<(), StorageError> {
        if id == 0 {
            return Err(StorageError::UnassignedId {
                backend: BACKEND,
                operation: "delete_session",
            });
        }
        let result = Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(write_failed("delete"))?;
        if result.rows_affected == 0 {
            return Err(StorageError::NotFound { backend: BACKEND, id });
        }
        debug!("Deleted session {}", id);
        Ok(())
    }

    async fn close(&self) {
        // The pool lives as long as the process.
        debug!("DatabaseStorage close requested, nothing to release");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tokio_test::assert_err;

    async fn temp_db() -> (TempDir, DatabaseStorage) {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let storage = DatabaseStorage::connect(&url).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn connect_fails_for_unreachable_database() {
        let dir = TempDir::new().unwrap();
        // read-only mode on a file that does not exist cannot be opened
        let url = format!("sqlite://{}?mode=ro", dir.path().join("missing.sqlite3").display());
        let err = assert_err!(DatabaseStorage::connect(&url).await);
        assert!(matches!(err, StorageError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn reopening_keeps_existing_rows() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("keep.sqlite3").display());
        let id = {
            let storage = DatabaseStorage::connect(&url).await.unwrap();
            storage
                .add_session(&Session {
                    title: "kept".into(),
                    ..Default::default()
                })
                .await
                .unwrap()
        };
        let storage = DatabaseStorage::connect(&url).await.unwrap();
        assert_eq!(storage.get_session(id).await.unwrap().title, "kept");
    }

    #[tokio::test]
    async fn list_back_fills_ids_from_row_keys() {
        let (_dir, storage) = temp_db().await;
        let a = storage
            .add_session(&Session {
                title: "b".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let b = storage
            .add_session(&Session {
                title: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = storage
            .list_sessions()
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_an_upsert() {
        let (_dir, storage) = temp_db().await;
        let err = storage
            .update_session(&Session {
                id: 41,
                title: "ghost".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(storage.list_sessions().await.unwrap().is_empty());
    }
}
