// ==========================================
// Portal IntraAMVALI - Erros do serviço de diagnóstico externo
// ==========================================

use thiserror::Error;

/// Falhas ao consultar o serviço externo de raciocínio.
///
/// Todas as variantes são da classe "dependência": retryáveis pelo
/// chamador e sem efeito sobre o estado do projeto.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// HTTP 429; retry_after_ms indica a espera sugerida
    #[error("limite de requisições do serviço de diagnóstico; aguardar {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Erro retornado pela API (ex.: 401 chave inválida, 500 interno)
    #[error("erro da API de diagnóstico (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Falha de rede (DNS, conexão recusada, timeout)
    #[error("falha de rede no serviço de diagnóstico: {0}")]
    Network(#[from] reqwest::Error),

    /// Resposta recebida mas sem o JSON esperado
    #[error("resposta inválida do serviço de diagnóstico: {0}")]
    InvalidResponse(String),

    /// Serviço não configurado (sem chave de API)
    #[error("serviço de diagnóstico não configurado")]
    NotConfigured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display() {
        let err = AdvisorError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "limite de requisições do serviço de diagnóstico; aguardar 5000ms"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdvisorError>();
    }
}
