// ==========================================
// Portal IntraAMVALI - Repositório de projetos
// ==========================================
// Responsabilidade: persistência de Project + consultas agregadas
// Concorrência: lock otimista via coluna revision (CAS no UPDATE)
// ==========================================
// Regras atendidas em transação (atomicidade):
// - criação compromete estrelas no saldo do município
// - conclusão libera estrelas e incrementa completed_projects
// - alocação regrava a equipe e recalcula active_projects dos técnicos
//   afetados sem estado intermediário observável
// ==========================================

use crate::domain::project::{Project, ProjectStage};
use crate::domain::technician::AssignedProjectRef;
use crate::domain::types::{Complexity, ProjectStatus, ProjectType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const PROJECT_COLUMNS: &str = r#"id, title, description, project_type, municipality_id,
    municipality_name, priority, complexity, impact_score, urgency_score, cost_score,
    ipr_score, status, paused_from, stages_json, progress_percent, assigned_team_json,
    location, scope, purpose, estimated_deadline, ai_justification, created_at,
    updated_at, revision"#;

/// Limites revalidados dentro da transação de criação
#[derive(Debug, Clone, Copy)]
pub struct CreationBudget {
    /// Orçamento de estrelas da área técnica do município
    pub star_budget: i32,
    /// Máximo de projetos ativos simultâneos para a prioridade pedida
    pub simultaneous_limit: i64,
}

// ==========================================
// ProjectRepository
// ==========================================
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Criação
    // ==========================================

    /// Cria o projeto comprometendo estrelas no saldo do município
    ///
    /// A validação de orçamento feita na camada de API é repetida aqui
    /// dentro da transação: duas criações concorrentes não podem ambas
    /// passar pelo limite lendo o mesmo saldo antigo.
    ///
    /// # Parâmetros
    /// - project: projeto já montado (id, roadmap, status inicial)
    /// - budget: limites a revalidar na transação
    pub fn create_committing_stars(
        &self,
        project: &Project,
        budget: CreationBudget,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let area = project.project_type.to_db_str();

        // Revalida o saldo de estrelas da área sob a transação
        let stars_json: String = tx
            .query_row(
                "SELECT active_stars_json FROM municipality WHERE id = ?1",
                params![&project.municipality_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "Municipality".to_string(),
                    id: project.municipality_id.clone(),
                },
                other => other.into(),
            })?;
        let mut stars: HashMap<String, i32> = serde_json::from_str(&stars_json)?;
        let current = stars.get(area).copied().unwrap_or(0);
        if current + project.priority > budget.star_budget {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "orçamento de estrelas excedido na área {}: atual={}, solicitado={}, máximo={}",
                area, current, project.priority, budget.star_budget
            )));
        }

        // Revalida o limite de projetos simultâneos da prioridade
        let active_same_priority: i64 = tx.query_row(
            r#"SELECT COUNT(*) FROM project
               WHERE municipality_id = ?1 AND priority = ?2
                 AND status NOT IN ('concluido', 'rascunho')"#,
            params![&project.municipality_id, project.priority],
            |row| row.get(0),
        )?;
        if active_same_priority >= budget.simultaneous_limit {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "limite de projetos simultâneos atingido para prioridade {} (máximo {})",
                project.priority, budget.simultaneous_limit
            )));
        }

        Self::insert_in_tx(&tx, project)?;

        // Compromete as estrelas e conta o projeto no município
        stars.insert(area.to_string(), current + project.priority);
        tx.execute(
            r#"UPDATE municipality
               SET active_stars_json = ?1, total_projects = total_projects + 1
               WHERE id = ?2"#,
            params![serde_json::to_string(&stars)?, &project.municipality_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Insere o projeto sem tocar contadores (uso em testes/seed)
    pub fn insert(&self, project: &Project) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with_conn(&conn, project)
    }

    fn insert_in_tx(tx: &Transaction<'_>, project: &Project) -> RepositoryResult<()> {
        Self::insert_with_conn(tx, project)
    }

    fn insert_with_conn(conn: &Connection, project: &Project) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO project (
                id, title, description, project_type, municipality_id, municipality_name,
                priority, complexity, impact_score, urgency_score, cost_score, ipr_score,
                status, paused_from, stages_json, progress_percent, assigned_team_json,
                location, scope, purpose, estimated_deadline, ai_justification,
                created_at, updated_at, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"#,
            params![
                &project.id,
                &project.title,
                &project.description,
                project.project_type.to_db_str(),
                &project.municipality_id,
                &project.municipality_name,
                project.priority,
                project.complexity.map(|c| c.to_db_str()),
                project.impact_score,
                project.urgency_score,
                project.cost_score,
                project.ipr_score,
                project.status.to_db_str(),
                project.paused_from.map(|s| s.to_db_str()),
                serde_json::to_string(&project.stages)?,
                project.progress_percent,
                serde_json::to_string(&project.assigned_team)?,
                &project.location,
                &project.scope,
                &project.purpose,
                &project.estimated_deadline,
                &project.ai_justification,
                &project.created_at,
                &project.updated_at,
                project.revision.unwrap_or(0),
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // Consultas
    // ==========================================

    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        Self::find_with_conn(&conn, id)
    }

    fn find_with_conn(conn: &Connection, id: &str) -> RepositoryResult<Option<Project>> {
        let sql = format!("SELECT {} FROM project WHERE id = ?1", PROJECT_COLUMNS);
        match conn.query_row(&sql, params![id], |row| Self::map_row(row)) {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Lista projetos com filtros opcionais, ordenados por IPR decrescente
    /// (projetos sem IPR ao final)
    pub fn list(
        &self,
        status: Option<ProjectStatus>,
        municipality_id: Option<&str>,
    ) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;

        let sql = format!(
            r#"SELECT {} FROM project
               WHERE (?1 IS NULL OR status = ?1)
                 AND (?2 IS NULL OR municipality_id = ?2)
               ORDER BY ipr_score IS NULL, ipr_score DESC, created_at ASC"#,
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![status.map(|s| s.to_db_str()), municipality_id],
            |row| Self::map_row(row),
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Candidatos à fila técnica (validacao/execucao); a ordenação final
    /// é responsabilidade do QueueRanker
    pub fn list_queue_candidates(&self) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM project WHERE status IN ('validacao', 'execucao')",
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Self::map_row(row))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ==========================================
    // Atualização (CAS)
    // ==========================================

    /// Atualiza o projeto com verificação de revision (lock otimista)
    ///
    /// Efeitos no saldo de estrelas do município, na mesma transação:
    /// - conclusão libera as estrelas da área e conta completed_projects
    /// - mudança de prioridade ajusta o saldo pelo delta, revalidando
    ///   o orçamento da área (star_budget)
    ///
    /// # Erros
    /// - OptimisticLockFailure: revision divergente (mutação concorrente)
    /// - NotFound: projeto inexistente
    /// - BusinessRuleViolation: aumento de prioridade estoura o orçamento
    pub fn update_cas(&self, project: &Project, star_budget: i32) -> RepositoryResult<Project> {
        let expected_revision = project.revision.ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "revision".to_string(),
                message: "atualização exige a revision lida".to_string(),
            }
        })?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let old: Option<(String, i32, i32)> = match tx.query_row(
            "SELECT status, revision, priority FROM project WHERE id = ?1",
            params![&project.id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        ) {
            Ok(v) => Some(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let (old_status, actual_revision, old_priority) = match old {
            Some(v) => v,
            None => {
                return Err(RepositoryError::NotFound {
                    entity: "Project".to_string(),
                    id: project.id.clone(),
                })
            }
        };

        let rows = tx.execute(
            r#"UPDATE project SET
                title = ?1, description = ?2, priority = ?3, complexity = ?4,
                impact_score = ?5, urgency_score = ?6, cost_score = ?7, ipr_score = ?8,
                status = ?9, paused_from = ?10, stages_json = ?11, progress_percent = ?12,
                assigned_team_json = ?13, location = ?14, scope = ?15, purpose = ?16,
                estimated_deadline = ?17, ai_justification = ?18, updated_at = ?19,
                revision = revision + 1
               WHERE id = ?20 AND revision = ?21"#,
            params![
                &project.title,
                &project.description,
                project.priority,
                project.complexity.map(|c| c.to_db_str()),
                project.impact_score,
                project.urgency_score,
                project.cost_score,
                project.ipr_score,
                project.status.to_db_str(),
                project.paused_from.map(|s| s.to_db_str()),
                serde_json::to_string(&project.stages)?,
                project.progress_percent,
                serde_json::to_string(&project.assigned_team)?,
                &project.location,
                &project.scope,
                &project.purpose,
                &project.estimated_deadline,
                &project.ai_justification,
                Utc::now(),
                &project.id,
                expected_revision,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::OptimisticLockFailure {
                entity: "Project".to_string(),
                id: project.id.clone(),
                expected: expected_revision,
                actual: actual_revision,
            });
        }

        // Conclusão: devolve as estrelas da área ao saldo do município
        if project.status == ProjectStatus::Concluido && old_status != "concluido" {
            Self::release_stars_in_tx(
                &tx,
                &project.municipality_id,
                project.project_type,
                old_priority,
            )?;
        } else if project.priority != old_priority && old_status != "concluido" {
            // Reprioritização: o saldo da área acompanha o delta
            Self::adjust_stars_in_tx(
                &tx,
                &project.municipality_id,
                project.project_type,
                old_priority,
                project.priority,
                star_budget,
            )?;
        }

        let updated = Self::find_with_conn(&tx, &project.id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Project".to_string(),
                id: project.id.clone(),
            }
        })?;

        tx.commit()?;
        Ok(updated)
    }

    fn adjust_stars_in_tx(
        tx: &Transaction<'_>,
        municipality_id: &str,
        area: ProjectType,
        old_priority: i32,
        new_priority: i32,
        star_budget: i32,
    ) -> RepositoryResult<()> {
        let stars_json: String = tx.query_row(
            "SELECT active_stars_json FROM municipality WHERE id = ?1",
            params![municipality_id],
            |row| row.get(0),
        )?;
        let mut stars: HashMap<String, i32> = serde_json::from_str(&stars_json)?;
        let key = area.to_db_str().to_string();
        let current = stars.get(&key).copied().unwrap_or(0);
        let adjusted = current - old_priority + new_priority;
        if adjusted > star_budget {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "orçamento de estrelas excedido na área {}: ajuste resultaria em {} (máximo {})",
                key, adjusted, star_budget
            )));
        }
        stars.insert(key, adjusted.max(0));

        tx.execute(
            "UPDATE municipality SET active_stars_json = ?1 WHERE id = ?2",
            params![serde_json::to_string(&stars)?, municipality_id],
        )?;
        Ok(())
    }

    fn release_stars_in_tx(
        tx: &Transaction<'_>,
        municipality_id: &str,
        area: ProjectType,
        stars_to_release: i32,
    ) -> RepositoryResult<()> {
        let stars_json: String = tx.query_row(
            "SELECT active_stars_json FROM municipality WHERE id = ?1",
            params![municipality_id],
            |row| row.get(0),
        )?;
        let mut stars: HashMap<String, i32> = serde_json::from_str(&stars_json)?;
        let key = area.to_db_str().to_string();
        let current = stars.get(&key).copied().unwrap_or(0);
        stars.insert(key, (current - stars_to_release).max(0));

        tx.execute(
            r#"UPDATE municipality
               SET active_stars_json = ?1, completed_projects = completed_projects + 1
               WHERE id = ?2"#,
            params![serde_json::to_string(&stars)?, municipality_id],
        )?;
        Ok(())
    }

    // ==========================================
    // Alocação de equipe
    // ==========================================

    /// Regrava a equipe do projeto e recalcula a contagem de projetos
    /// ativos de cada técnico afetado, tudo na mesma transação
    ///
    /// # Parâmetros
    /// - project: projeto com assigned_team já no estado desejado
    /// - affected: técnicos removidos e adicionados (união)
    pub fn apply_allocation_cas(
        &self,
        project: &Project,
        affected: &[String],
    ) -> RepositoryResult<Project> {
        let expected_revision = project.revision.ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "revision".to_string(),
                message: "alocação exige a revision lida".to_string(),
            }
        })?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            r#"UPDATE project
               SET assigned_team_json = ?1, updated_at = ?2, revision = revision + 1
               WHERE id = ?3 AND revision = ?4"#,
            params![
                serde_json::to_string(&project.assigned_team)?,
                Utc::now(),
                &project.id,
                expected_revision,
            ],
        )?;

        if rows == 0 {
            let actual: Option<i32> = match tx.query_row(
                "SELECT revision FROM project WHERE id = ?1",
                params![&project.id],
                |row| row.get(0),
            ) {
                Ok(v) => Some(v),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };
            return match actual {
                Some(actual_revision) => Err(RepositoryError::OptimisticLockFailure {
                    entity: "Project".to_string(),
                    id: project.id.clone(),
                    expected: expected_revision,
                    actual: actual_revision,
                }),
                None => Err(RepositoryError::NotFound {
                    entity: "Project".to_string(),
                    id: project.id.clone(),
                }),
            };
        }

        // Recontagem dos técnicos afetados dentro da mesma transação:
        // não há janela em que um técnico esteja contado em dobro
        for technician_id in affected {
            let count = Self::count_active_assigned_with_conn(&tx, technician_id)?;
            tx.execute(
                "UPDATE technician SET active_projects = ?1 WHERE id = ?2",
                params![count, technician_id],
            )?;
        }

        let updated = Self::find_with_conn(&tx, &project.id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Project".to_string(),
                id: project.id.clone(),
            }
        })?;

        tx.commit()?;
        Ok(updated)
    }

    // ==========================================
    // Contagens e projeções
    // ==========================================

    /// Projetos ativos do município na prioridade informada (pré-checagem
    /// do limite de simultaneidade; a criação revalida em transação)
    pub fn count_active_by_priority(
        &self,
        municipality_id: &str,
        priority: i32,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row(
            r#"SELECT COUNT(*) FROM project
               WHERE municipality_id = ?1 AND priority = ?2
                 AND status NOT IN ('concluido', 'rascunho')"#,
            params![municipality_id, priority],
            |row| row.get(0),
        )?)
    }

    /// Projetos ativos de um técnico (membro de assigned_team, fora
    /// rascunho/concluido)
    pub fn count_active_assigned(&self, technician_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::count_active_assigned_with_conn(&conn, technician_id)
    }

    fn count_active_assigned_with_conn(
        conn: &Connection,
        technician_id: &str,
    ) -> RepositoryResult<i64> {
        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*)
               FROM project, json_each(project.assigned_team_json)
               WHERE json_each.value = ?1
                 AND project.status NOT IN ('concluido', 'rascunho')"#,
            params![technician_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Referências resumidas dos projetos não concluídos de um técnico
    pub fn list_assigned_refs(
        &self,
        technician_id: &str,
    ) -> RepositoryResult<Vec<AssignedProjectRef>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT project.id, project.title, project.priority, project.status
               FROM project, json_each(project.assigned_team_json)
               WHERE json_each.value = ?1 AND project.status != 'concluido'
               ORDER BY project.created_at ASC"#,
        )?;

        let rows = stmt.query_map(params![technician_id], |row| {
            let status_raw: String = row.get(3)?;
            let status = ProjectStatus::from_db_str(&status_raw).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(3, status_raw.clone(), rusqlite::types::Type::Text)
            })?;
            Ok(AssignedProjectRef {
                id: row.get(0)?,
                title: row.get(1)?,
                priority: row.get(2)?,
                status,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM project", [], |row| row.get(0))?)
    }

    pub fn count_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM project GROUP BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_by_type(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT project_type, COUNT(*) FROM project GROUP BY project_type")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Projetos em execução há mais tempo que o corte informado
    pub fn count_overdue_execution(&self, cutoff: DateTime<Utc>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM project WHERE status = 'execucao' AND created_at < ?1",
            params![cutoff],
            |row| row.get(0),
        )?)
    }

    pub fn count_queue_size(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM project WHERE status IN ('validacao', 'execucao')",
            [],
            |row| row.get(0),
        )?)
    }

    // ==========================================
    // Mapeamento de linha
    // ==========================================

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Project> {
        let project_type_raw: String = row.get(3)?;
        let project_type = ProjectType::from_db_str(&project_type_raw).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(3, project_type_raw.clone(), rusqlite::types::Type::Text)
        })?;

        let complexity_raw: Option<String> = row.get(7)?;
        let complexity = match complexity_raw {
            Some(raw) => Some(Complexity::from_db_str(&raw).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(7, raw.clone(), rusqlite::types::Type::Text)
            })?),
            None => None,
        };

        let status_raw: String = row.get(12)?;
        let status = ProjectStatus::from_db_str(&status_raw).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(12, status_raw.clone(), rusqlite::types::Type::Text)
        })?;

        let paused_from_raw: Option<String> = row.get(13)?;
        let paused_from = match paused_from_raw {
            Some(raw) => Some(ProjectStatus::from_db_str(&raw).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(13, raw.clone(), rusqlite::types::Type::Text)
            })?),
            None => None,
        };

        let stages_json: String = row.get(14)?;
        let stages: Vec<ProjectStage> = serde_json::from_str(&stages_json).map_err(|e| {
            rusqlite::Error::InvalidColumnType(14, e.to_string(), rusqlite::types::Type::Text)
        })?;

        let team_json: String = row.get(16)?;
        let assigned_team: Vec<String> = serde_json::from_str(&team_json).map_err(|e| {
            rusqlite::Error::InvalidColumnType(16, e.to_string(), rusqlite::types::Type::Text)
        })?;

        Ok(Project {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            project_type,
            municipality_id: row.get(4)?,
            municipality_name: row.get(5)?,
            priority: row.get(6)?,
            complexity,
            impact_score: row.get(8)?,
            urgency_score: row.get(9)?,
            cost_score: row.get(10)?,
            ipr_score: row.get(11)?,
            status,
            paused_from,
            stages,
            progress_percent: row.get(15)?,
            assigned_team,
            location: row.get(17)?,
            scope: row.get(18)?,
            purpose: row.get(19)?,
            estimated_deadline: row.get(20)?,
            ai_justification: row.get(21)?,
            created_at: row.get(22)?,
            updated_at: row.get(23)?,
            revision: Some(row.get(24)?),
        })
    }
}
