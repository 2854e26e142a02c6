// ==========================================
// Portal IntraAMVALI - Orçamento de prioridade (estrelas)
// ==========================================
// Responsabilidade: limites de prioridade na criação/atualização
// - saldo de estrelas por área técnica do município (orçamento fixo):
//   com orçamento 5, no máximo um projeto de 5 estrelas por área
// - limite de projetos ativos simultâneos por prioridade
// A fila assume esses invariantes já garantidos; nada é re-checado
// na ordenação.
// ==========================================

use crate::domain::municipality::Municipality;
use crate::domain::types::ProjectType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetViolation {
    #[error("orçamento de estrelas excedido na área {area}: atual={current}, solicitado={requested}, máximo={budget}")]
    StarBudgetExceeded {
        area: String,
        current: i32,
        requested: i32,
        budget: i32,
    },

    #[error("limite de projetos simultâneos atingido para prioridade {priority} (máximo {limit})")]
    SimultaneousLimitReached { priority: i32, limit: i64 },
}

// ==========================================
// PriorityBudget
// ==========================================
pub struct PriorityBudget {
    star_budget: i32,
}

impl PriorityBudget {
    pub fn new(star_budget: i32) -> Self {
        Self { star_budget }
    }

    pub fn star_budget(&self) -> i32 {
        self.star_budget
    }

    /// Máximo de projetos ativos simultâneos para a prioridade
    ///
    /// Prioridade máxima é exclusiva (1 projeto); prioridades menores
    /// admitem mais simultaneidade.
    pub fn simultaneous_limit(&self, priority: i32) -> i64 {
        match priority {
            5 => 1,
            4 => 2,
            3 => 3,
            2 => 4,
            _ => 5,
        }
    }

    /// Valida o pedido de estrelas contra o saldo da área
    ///
    /// # Parâmetros
    /// - municipality: município com saldo atual de estrelas
    /// - area: área técnica do projeto
    /// - requested: estrelas do projeto novo
    pub fn check_star_request(
        &self,
        municipality: &Municipality,
        area: ProjectType,
        requested: i32,
    ) -> Result<(), BudgetViolation> {
        let current = municipality.stars_in_area(area);
        if current + requested > self.star_budget {
            return Err(BudgetViolation::StarBudgetExceeded {
                area: area.to_string(),
                current,
                requested,
                budget: self.star_budget,
            });
        }
        Ok(())
    }

    /// Valida o limite de simultaneidade da prioridade
    pub fn check_simultaneous(
        &self,
        priority: i32,
        active_same_priority: i64,
    ) -> Result<(), BudgetViolation> {
        let limit = self.simultaneous_limit(priority);
        if active_same_priority >= limit {
            return Err(BudgetViolation::SimultaneousLimitReached { priority, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn municipality_with_stars(area: ProjectType, stars: i32) -> Municipality {
        let mut m = Municipality::new("Guaramirim", "GR", "contato@guaramirim.sc.gov.br");
        m.active_stars.insert(area.to_db_str().to_string(), stars);
        m
    }

    #[test]
    fn test_star_budget_allows_up_to_budget() {
        let budget = PriorityBudget::new(5);
        let m = municipality_with_stars(ProjectType::Edificacao, 2);
        assert!(budget
            .check_star_request(&m, ProjectType::Edificacao, 3)
            .is_ok());
        assert!(budget
            .check_star_request(&m, ProjectType::Edificacao, 4)
            .is_err());
    }

    #[test]
    fn test_star_budget_is_per_area() {
        let budget = PriorityBudget::new(5);
        let m = municipality_with_stars(ProjectType::Edificacao, 5);
        // Outra área tem saldo próprio
        assert!(budget
            .check_star_request(&m, ProjectType::Pavimentacao, 5)
            .is_ok());
    }

    #[test]
    fn test_only_one_five_star_per_area() {
        let budget = PriorityBudget::new(5);
        let empty = municipality_with_stars(ProjectType::Infraestrutura, 0);
        assert!(budget
            .check_star_request(&empty, ProjectType::Infraestrutura, 5)
            .is_ok());

        let taken = municipality_with_stars(ProjectType::Infraestrutura, 5);
        // Com o orçamento consumido, nem 1 estrela cabe
        assert!(budget
            .check_star_request(&taken, ProjectType::Infraestrutura, 1)
            .is_err());
    }

    #[test]
    fn test_simultaneous_limits_by_priority() {
        let budget = PriorityBudget::new(5);
        assert_eq!(budget.simultaneous_limit(5), 1);
        assert_eq!(budget.simultaneous_limit(4), 2);
        assert_eq!(budget.simultaneous_limit(3), 3);
        assert_eq!(budget.simultaneous_limit(2), 4);
        assert_eq!(budget.simultaneous_limit(1), 5);

        assert!(budget.check_simultaneous(5, 0).is_ok());
        assert!(budget.check_simultaneous(5, 1).is_err());
        assert!(budget.check_simultaneous(3, 2).is_ok());
        assert!(budget.check_simultaneous(3, 3).is_err());
    }
}
