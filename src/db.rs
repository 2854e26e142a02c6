// ==========================================
// Portal IntraAMVALI - Infraestrutura SQLite
// ==========================================
// Objetivos:
// - Unificar PRAGMA em todas as aberturas de conexão (foreign_keys,
//   busy_timeout), evitando comportamento divergente entre módulos
// - Bootstrap idempotente do schema (CREATE TABLE IF NOT EXISTS)
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// busy_timeout padrão (milissegundos)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Versão de schema esperada pelo código atual
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Configura a conexão SQLite com os PRAGMA unificados
///
/// foreign_keys e busy_timeout precisam ser aplicados por conexão.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Abre uma conexão SQLite já configurada
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Inicializa o schema do núcleo (idempotente)
///
/// # Tabelas
/// - config_scope / config_kv: parâmetros nomeados (escopo global)
/// - municipality: municípios consorciados + saldo de estrelas por área
/// - technician: equipe técnica e contadores de carga
/// - project: projetos, etapas (JSON), lock otimista via revision
/// - notification: notificações emitidas em transições de etapa
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS municipality (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            contact_email TEXT NOT NULL,
            contact_phone TEXT,
            engagement_score REAL NOT NULL DEFAULT 0,
            meeting_participations INTEGER NOT NULL DEFAULT 0,
            clarity_score REAL NOT NULL DEFAULT 0,
            financial_regularity INTEGER NOT NULL DEFAULT 1,
            total_projects INTEGER NOT NULL DEFAULT 0,
            completed_projects INTEGER NOT NULL DEFAULT 0,
            active_stars_json TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS technician (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            specialties_json TEXT NOT NULL DEFAULT '[]',
            workload_hours INTEGER NOT NULL DEFAULT 40,
            active_projects INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS project (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            project_type TEXT NOT NULL,
            municipality_id TEXT NOT NULL REFERENCES municipality(id),
            municipality_name TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 3,
            complexity TEXT,
            impact_score INTEGER NOT NULL DEFAULT 1,
            urgency_score INTEGER NOT NULL DEFAULT 1,
            cost_score INTEGER NOT NULL DEFAULT 1,
            ipr_score REAL,
            status TEXT NOT NULL,
            paused_from TEXT,
            stages_json TEXT NOT NULL DEFAULT '[]',
            progress_percent REAL NOT NULL DEFAULT 0,
            assigned_team_json TEXT NOT NULL DEFAULT '[]',
            location TEXT,
            scope TEXT,
            purpose TEXT,
            estimated_deadline TEXT,
            ai_justification TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_project_status ON project(status);
        CREATE INDEX IF NOT EXISTS idx_project_municipality ON project(municipality_id);

        CREATE TABLE IF NOT EXISTS notification (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            notification_type TEXT NOT NULL DEFAULT 'info',
            read INTEGER NOT NULL DEFAULT 0,
            project_id TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notification_user ON notification(user_id);

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}

/// Lê a versão de schema registrada (None se a tabela não existir)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    use rusqlite::OptionalExtension;

    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
