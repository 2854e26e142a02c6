// ==========================================
// Portal IntraAMVALI - Repositório de municípios
// ==========================================
// O saldo de estrelas (active_stars_json) é mutado apenas pelas
// transações do ProjectRepository; aqui só leitura e cadastro.
// ==========================================

use crate::domain::municipality::{EngagementUpdate, Municipality};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const MUNICIPALITY_COLUMNS: &str = r#"id, name, code, contact_email, contact_phone,
    engagement_score, meeting_participations, clarity_score, financial_regularity,
    total_projects, completed_projects, active_stars_json, created_at"#;

pub struct MunicipalityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MunicipalityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, municipality: &Municipality) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO municipality (
                id, name, code, contact_email, contact_phone, engagement_score,
                meeting_participations, clarity_score, financial_regularity,
                total_projects, completed_projects, active_stars_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
            params![
                &municipality.id,
                &municipality.name,
                &municipality.code,
                &municipality.contact_email,
                &municipality.contact_phone,
                municipality.engagement_score,
                municipality.meeting_participations,
                municipality.clarity_score,
                municipality.financial_regularity,
                municipality.total_projects,
                municipality.completed_projects,
                serde_json::to_string(&municipality.active_stars)?,
                &municipality.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Municipality>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM municipality WHERE id = ?1",
            MUNICIPALITY_COLUMNS
        );
        match conn.query_row(&sql, params![id], |row| Self::map_row(row)) {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> RepositoryResult<Vec<Municipality>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM municipality ORDER BY name ASC",
            MUNICIPALITY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Self::map_row(row))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM municipality", [], |row| row.get(0))?)
    }

    /// Atualiza os sinais de engajamento do município
    pub fn update_engagement(
        &self,
        id: &str,
        update: &EngagementUpdate,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"UPDATE municipality SET
                engagement_score = ?1, meeting_participations = ?2,
                clarity_score = ?3, financial_regularity = ?4
               WHERE id = ?5"#,
            params![
                update.engagement_score,
                update.meeting_participations,
                update.clarity_score,
                update.financial_regularity,
                id,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Municipality".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Municipality> {
        let stars_json: String = row.get(11)?;
        let active_stars: HashMap<String, i32> = serde_json::from_str(&stars_json)
            .map_err(|e| {
                rusqlite::Error::InvalidColumnType(11, e.to_string(), rusqlite::types::Type::Text)
            })?;

        Ok(Municipality {
            id: row.get(0)?,
            name: row.get(1)?,
            code: row.get(2)?,
            contact_email: row.get(3)?,
            contact_phone: row.get(4)?,
            engagement_score: row.get(5)?,
            meeting_participations: row.get(6)?,
            clarity_score: row.get(7)?,
            financial_regularity: row.get(8)?,
            total_projects: row.get(9)?,
            completed_projects: row.get(10)?,
            active_stars,
            created_at: row.get(12)?,
        })
    }
}
