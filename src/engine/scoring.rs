// ==========================================
// Portal IntraAMVALI - Engine de pontuação (IPR)
// ==========================================
// Responsabilidade: cálculo do Índice de Prioridade Regional
// Entrada: impacto/urgência/custo [1,10] + complexidade classificada
// Saída: IPR (float), função pura e determinística
// ==========================================
// Fórmula: IPR = (impacto*3 + urgência*2 + custo*1) / divisor(complexidade)
// Projeto sem complexidade classificada não recebe score: a ausência
// propaga (Option) em vez de assumir um divisor padrão.
// ==========================================

use crate::config::IprDivisors;
use crate::domain::types::Complexity;

/// Peso do impacto regional na combinação linear
pub const IMPACT_WEIGHT: f64 = 3.0;
/// Peso da urgência
pub const URGENCY_WEIGHT: f64 = 2.0;
/// Peso do custo
pub const COST_WEIGHT: f64 = 1.0;

// ==========================================
// ScoringEngine
// ==========================================
pub struct ScoringEngine {
    divisors: IprDivisors,
}

impl ScoringEngine {
    pub fn new(divisors: IprDivisors) -> Self {
        Self { divisors }
    }

    /// Calcula o IPR para uma complexidade conhecida
    ///
    /// Total sobre o domínio válido; monotônica crescente nos três
    /// insumos e decrescente no divisor de complexidade.
    ///
    /// # Parâmetros
    /// - impact, urgency, cost: inteiros em [1,10] (validados na API)
    /// - complexity: classificação já atribuída
    pub fn compute_ipr(&self, impact: i32, urgency: i32, cost: i32, complexity: Complexity) -> f64 {
        let weighted = f64::from(impact) * IMPACT_WEIGHT
            + f64::from(urgency) * URGENCY_WEIGHT
            + f64::from(cost) * COST_WEIGHT;
        weighted / self.divisor_for(complexity)
    }

    /// Variante que propaga a ausência de classificação
    ///
    /// # Retorno
    /// - Some(ipr) quando a complexidade é conhecida
    /// - None quando ausente (projeto ainda não ranqueável)
    pub fn compute_ipr_opt(
        &self,
        impact: i32,
        urgency: i32,
        cost: i32,
        complexity: Option<Complexity>,
    ) -> Option<f64> {
        complexity.map(|c| self.compute_ipr(impact, urgency, cost, c))
    }

    fn divisor_for(&self, complexity: Complexity) -> f64 {
        match complexity {
            Complexity::Minima => self.divisors.minima,
            Complexity::Media => self.divisors.media,
            Complexity::Alta => self.divisors.alta,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(IprDivisors::default())
    }
}
