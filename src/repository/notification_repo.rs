// ==========================================
// Portal IntraAMVALI - Repositório de notificações
// ==========================================

use crate::domain::notification::Notification;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, notification_type, read, project_id, created_at";

pub struct NotificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl NotificationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, notification: &Notification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO notification (
                id, user_id, title, message, notification_type, read, project_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                &notification.id,
                &notification.user_id,
                &notification.title,
                &notification.message,
                &notification.notification_type,
                notification.read,
                &notification.project_id,
                &notification.created_at,
            ],
        )?;
        Ok(())
    }

    /// Notificações destinadas ao usuário ou aos escopos informados
    /// (papel municipal recebe também as do próprio município)
    pub fn list_for_scopes(&self, scopes: &[String], limit: i64) -> RepositoryResult<Vec<Notification>> {
        if scopes.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=scopes.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM notification WHERE user_id IN ({}) ORDER BY created_at DESC LIMIT {}",
            NOTIFICATION_COLUMNS, placeholders, limit
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(scopes.iter()),
            |row| Self::map_row(row),
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn mark_read(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE notification SET read = 1 WHERE id = ?1",
            params![id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Notification".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            message: row.get(3)?,
            notification_type: row.get(4)?,
            read: row.get(5)?,
            project_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}
