// ==========================================
// Portal IntraAMVALI - API de municípios
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_required_text;
use crate::domain::municipality::{EngagementUpdate, Municipality, NewMunicipality};
use crate::domain::types::{Principal, UserRole};
use crate::repository::MunicipalityRepository;

pub struct MunicipalityApi {
    municipality_repo: Arc<MunicipalityRepository>,
}

impl MunicipalityApi {
    pub fn new(municipality_repo: Arc<MunicipalityRepository>) -> Self {
        Self { municipality_repo }
    }

    /// Cadastro de município (somente gestão)
    pub fn create(&self, principal: &Principal, new: NewMunicipality) -> ApiResult<Municipality> {
        if principal.role != UserRole::GestorAmvali {
            return Err(ApiError::Authorization(
                "somente gestores podem cadastrar municípios".to_string(),
            ));
        }
        validate_required_text("name", &new.name)?;
        validate_required_text("code", &new.code)?;
        validate_required_text("contact_email", &new.contact_email)?;

        let mut municipality = Municipality::new(new.name, new.code, new.contact_email);
        municipality.contact_phone = new.contact_phone;

        self.municipality_repo.insert(&municipality)?;
        Ok(municipality)
    }

    pub fn list(&self, _principal: &Principal) -> ApiResult<Vec<Municipality>> {
        Ok(self.municipality_repo.list()?)
    }

    pub fn get(&self, _principal: &Principal, id: &str) -> ApiResult<Municipality> {
        self.municipality_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Municipality(id={}) não existe", id)))
    }

    /// Atualiza sinais de engajamento (somente gestão)
    pub fn update_engagement(
        &self,
        principal: &Principal,
        id: &str,
        update: EngagementUpdate,
    ) -> ApiResult<Municipality> {
        if principal.role != UserRole::GestorAmvali {
            return Err(ApiError::Authorization(
                "somente gestores podem atualizar engajamento".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&update.engagement_score) {
            return Err(ApiError::Validation(format!(
                "engagement_score deve estar entre 0 e 100 (recebido: {})",
                update.engagement_score
            )));
        }

        self.municipality_repo.update_engagement(id, &update)?;
        self.get(principal, id)
    }
}
