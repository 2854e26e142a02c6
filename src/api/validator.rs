// ==========================================
// Portal IntraAMVALI - Validação de entrada
// ==========================================
// Faixas do modelo: scores [1,10], prioridade [1,5].
// Toda validação roda antes de qualquer mutação.
// ==========================================

use crate::api::error::{ApiError, ApiResult};

/// Valida um score de insumo do IPR no intervalo [1,10]
pub fn validate_score(field: &str, value: i32) -> ApiResult<()> {
    if !(1..=10).contains(&value) {
        return Err(ApiError::Validation(format!(
            "{} deve estar entre 1 e 10 (recebido: {})",
            field, value
        )));
    }
    Ok(())
}

/// Valida a prioridade em estrelas no intervalo [1,5]
pub fn validate_priority(value: i32) -> ApiResult<()> {
    if !(1..=5).contains(&value) {
        return Err(ApiError::Validation(format!(
            "priority deve estar entre 1 e 5 (recebido: {})",
            value
        )));
    }
    Ok(())
}

/// Valida texto obrigatório não vazio
pub fn validate_required_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} é obrigatório", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(validate_score("impact_score", 1).is_ok());
        assert!(validate_score("impact_score", 10).is_ok());
        assert!(validate_score("impact_score", 0).is_err());
        assert!(validate_score("impact_score", 11).is_err());
    }

    #[test]
    fn test_priority_bounds() {
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(5).is_ok());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(6).is_err());
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("title", "Creche Municipal").is_ok());
        assert!(validate_required_text("title", "   ").is_err());
    }
}
