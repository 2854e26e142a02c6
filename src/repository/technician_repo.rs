// ==========================================
// Portal IntraAMVALI - Repositório de técnicos
// ==========================================
// active_projects é recalculado pelas transações de alocação
// (ProjectRepository::apply_allocation_cas); aqui cadastro e leitura.
// ==========================================

use crate::domain::technician::Technician;
use crate::domain::types::ProjectType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

const TECHNICIAN_COLUMNS: &str =
    "id, name, email, specialties_json, workload_hours, active_projects, created_at";

pub struct TechnicianRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TechnicianRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, technician: &Technician) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO technician (
                id, name, email, specialties_json, workload_hours,
                active_projects, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                &technician.id,
                &technician.name,
                &technician.email,
                serde_json::to_string(&technician.specialties)?,
                technician.workload_hours,
                technician.active_projects,
                &technician.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Technician>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM technician WHERE id = ?1", TECHNICIAN_COLUMNS);
        match conn.query_row(&sql, params![id], |row| Self::map_row(row)) {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> RepositoryResult<Vec<Technician>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM technician ORDER BY name ASC", TECHNICIAN_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Self::map_row(row))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Verifica existência de todos os ids; retorna os ausentes
    pub fn find_missing(&self, ids: &[String]) -> RepositoryResult<Vec<String>> {
        let mut missing = Vec::new();
        for id in ids {
            if self.find_by_id(id)?.is_none() {
                missing.push(id.clone());
            }
        }
        Ok(missing)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Technician> {
        let specialties_json: String = row.get(3)?;
        let specialties: Vec<ProjectType> = serde_json::from_str(&specialties_json)
            .map_err(|e| {
                rusqlite::Error::InvalidColumnType(3, e.to_string(), rusqlite::types::Type::Text)
            })?;

        Ok(Technician {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            specialties,
            workload_hours: row.get(4)?,
            active_projects: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
