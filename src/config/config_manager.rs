// ==========================================
// Portal IntraAMVALI - Gerenciador de configuração
// ==========================================
// Responsabilidade: leitura de parâmetros nomeados com padrão documentado
// Armazenamento: tabela config_kv (key-value, escopo 'global')
// ==========================================
// Os valores de divisor do IPR e o limiar de alerta de capacidade são
// constantes de produto ainda sem justificativa formal de calibração;
// ficam aqui como configuração sobreponível, não como literais no código.
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// Padrões nomeados
// ==========================================

/// Divisor do IPR para complexidade mínima
pub const DEFAULT_IPR_DIVISOR_MINIMA: f64 = 1.0;
/// Divisor do IPR para complexidade média
pub const DEFAULT_IPR_DIVISOR_MEDIA: f64 = 5.0;
/// Divisor do IPR para complexidade alta
pub const DEFAULT_IPR_DIVISOR_ALTA: f64 = 10.0;

/// Custo fixo em horas semanais de cada projeto ativo alocado
pub const DEFAULT_HOURS_PER_PROJECT: f64 = 8.0;
/// Limiar consultivo de alerta de capacidade (%)
pub const DEFAULT_CAPACITY_ALERT_PCT: f64 = 85.0;

/// Orçamento de estrelas simultâneas por área técnica de um município
pub const DEFAULT_STAR_BUDGET_PER_AREA: i32 = 5;

/// Dias em execução a partir dos quais o projeto conta como atrasado
pub const DEFAULT_OVERDUE_EXECUTION_DAYS: i64 = 30;

/// Timeout do serviço externo de diagnóstico (segundos)
pub const DEFAULT_ADVISOR_TIMEOUT_SECS: u64 = 30;
/// Modelo padrão do serviço externo de diagnóstico
pub const DEFAULT_ADVISOR_MODEL: &str = "claude-sonnet-4-5-20250929";

// ==========================================
// Conjuntos tipados de parâmetros
// ==========================================

/// Divisores do IPR por complexidade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IprDivisors {
    pub minima: f64,
    pub media: f64,
    pub alta: f64,
}

impl Default for IprDivisors {
    fn default() -> Self {
        Self {
            minima: DEFAULT_IPR_DIVISOR_MINIMA,
            media: DEFAULT_IPR_DIVISOR_MEDIA,
            alta: DEFAULT_IPR_DIVISOR_ALTA,
        }
    }
}

/// Parâmetros de capacidade da equipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityParams {
    /// Horas semanais consumidas por projeto ativo
    pub hours_per_project: f64,
    /// Percentual a partir do qual a alocação gera alerta (consultivo)
    pub alert_threshold_pct: f64,
}

impl Default for CapacityParams {
    fn default() -> Self {
        Self {
            hours_per_project: DEFAULT_HOURS_PER_PROJECT,
            alert_threshold_pct: DEFAULT_CAPACITY_ALERT_PCT,
        }
    }
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Cria um ConfigManager abrindo a própria conexão
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Cria um ConfigManager sobre uma conexão compartilhada
    ///
    /// Reaplica os PRAGMA unificados na conexão recebida (idempotente).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn std::error::Error>> {
        {
            let guard = conn
                .lock()
                .map_err(|e| format!("falha ao obter lock da conexão: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// Lê um valor do escopo global
    fn get_config_value(&self, key: &str) -> Option<String> {
        let conn = match self.conn.lock() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("config: lock da conexão indisponível: {}", e);
                return None;
            }
        };

        match conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        ) {
            Ok(v) => Some(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                tracing::warn!("config: falha ao ler chave {}: {}", key, e);
                None
            }
        }
    }

    fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_config_value(key)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default)
    }

    fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_config_value(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default)
    }

    /// Grava um valor no escopo global (upsert)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("falha ao obter lock da conexão: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')"#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // Getters tipados
    // ==========================================

    /// Divisores do IPR (chaves ipr/divisor_*)
    pub fn ipr_divisors(&self) -> IprDivisors {
        IprDivisors {
            minima: self.get_f64_or("ipr/divisor_minima", DEFAULT_IPR_DIVISOR_MINIMA),
            media: self.get_f64_or("ipr/divisor_media", DEFAULT_IPR_DIVISOR_MEDIA),
            alta: self.get_f64_or("ipr/divisor_alta", DEFAULT_IPR_DIVISOR_ALTA),
        }
    }

    /// Parâmetros de capacidade (chaves capacidade/*)
    pub fn capacity_params(&self) -> CapacityParams {
        CapacityParams {
            hours_per_project: self
                .get_f64_or("capacidade/horas_por_projeto", DEFAULT_HOURS_PER_PROJECT),
            alert_threshold_pct: self
                .get_f64_or("capacidade/limiar_alerta_pct", DEFAULT_CAPACITY_ALERT_PCT),
        }
    }

    /// Orçamento de estrelas por área técnica
    pub fn star_budget_per_area(&self) -> i32 {
        self.get_i64_or(
            "prioridade/orcamento_estrelas_area",
            DEFAULT_STAR_BUDGET_PER_AREA as i64,
        ) as i32
    }

    /// Dias em execução para contagem de atraso no painel
    pub fn overdue_execution_days(&self) -> i64 {
        self.get_i64_or("painel/dias_atraso_execucao", DEFAULT_OVERDUE_EXECUTION_DAYS)
    }

    /// Timeout do serviço de diagnóstico (segundos)
    pub fn advisor_timeout_secs(&self) -> u64 {
        self.get_i64_or(
            "advisor/timeout_segundos",
            DEFAULT_ADVISOR_TIMEOUT_SECS as i64,
        ) as u64
    }

    /// Modelo do serviço de diagnóstico
    pub fn advisor_model(&self) -> String {
        self.get_config_value("advisor/modelo")
            .unwrap_or_else(|| DEFAULT_ADVISOR_MODEL.to_string())
    }
}
