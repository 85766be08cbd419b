// src/services/cost_catalog.rs
//
// Catálogo de custos: cadastro com regra de aplicabilidade, listagem com
// filtros e desativação (soft delete).

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CostRepository},
    models::{
        catalog::ServiceType,
        costs::{ApplicationMode, Cost, CostFrequency, CostKind, CostServiceLink},
    },
};

/// A quais serviços um custo novo se aplica.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CostApplicability {
    /// Todos os serviços ativos NO MOMENTO DO CADASTRO. Vira um snapshot de
    /// vínculos Full/100%; serviços criados depois não entram
    /// retroativamente. Comportamento documentado, não é bug.
    All,
    /// Lista explícita de serviços, cada um com percentual de rateio
    /// opcional (default 100).
    Services { services: Vec<ServiceLinkSpec> },
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLinkSpec {
    pub service_id: Uuid,
    #[schema(example = "50.00")]
    pub percentage: Option<Decimal>,
}

/// Especificação dos vínculos a materializar para um custo novo. Função
/// pura: decide (serviço, modo, percentual) a partir da regra e dos serviços
/// ativos no instante do cadastro. Lista explícita que aponta para um
/// serviço fora do catálogo ativo é rejeitada antes de qualquer escrita.
pub fn materialize_links(
    applicability: &CostApplicability,
    active_services: &[ServiceType],
) -> Result<Vec<(Uuid, ApplicationMode, Decimal)>, AppError> {
    let hundred = Decimal::from(100);

    match applicability {
        CostApplicability::All => Ok(active_services
            .iter()
            .map(|s| (s.id, ApplicationMode::Full, hundred))
            .collect()),
        CostApplicability::Services { services } => services
            .iter()
            .map(|spec| {
                if !active_services.iter().any(|s| s.id == spec.service_id) {
                    return Err(AppError::ServiceNotFound);
                }
                let pct = spec.percentage.unwrap_or(hundred);
                let mode = if pct == hundred {
                    ApplicationMode::Full
                } else {
                    ApplicationMode::Prorated
                };
                Ok((spec.service_id, mode, pct))
            })
            .collect(),
    }
}

#[derive(Clone)]
pub struct CostCatalogService {
    cost_repo: CostRepository,
    catalog_repo: CatalogRepository,
}

impl CostCatalogService {
    pub fn new(cost_repo: CostRepository, catalog_repo: CatalogRepository) -> Self {
        Self { cost_repo, catalog_repo }
    }

    pub async fn list_costs(
        &self,
        pool: &PgPool,
        kind: Option<CostKind>,
        frequency: Option<CostFrequency>,
    ) -> Result<Vec<Cost>, AppError> {
        self.cost_repo.list_active(pool, kind, frequency).await
    }

    /// Cria o custo e materializa os vínculos num único commit. O snapshot de
    /// "todos os serviços" é congelado aqui e nunca re-derivado na leitura.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_cost(
        &self,
        pool: &PgPool,
        name: &str,
        amount: Decimal,
        kind: CostKind,
        frequency: CostFrequency,
        note: Option<&str>,
        applicability: CostApplicability,
    ) -> Result<(Cost, Vec<CostServiceLink>), AppError> {
        let active_services = self.catalog_repo.list_active_services(pool).await?;
        let specs = materialize_links(&applicability, &active_services)?;

        let mut tx = pool.begin().await?;

        let cost = self
            .cost_repo
            .create_cost(&mut *tx, name, amount, kind, frequency, note)
            .await?;

        let mut links = Vec::with_capacity(specs.len());
        for (service_id, mode, percentage) in specs {
            let link = self
                .cost_repo
                .insert_link(&mut *tx, cost.id, service_id, mode, percentage)
                .await?;
            links.push(link);
        }

        tx.commit().await?;

        tracing::info!(
            "Custo '{}' cadastrado com {} vínculo(s) de rateio",
            cost.name,
            links.len()
        );

        Ok((cost, links))
    }

    pub async fn deactivate_cost(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let rows = self.cost_repo.deactivate(pool, id).await?;
        if rows == 0 {
            return Err(AppError::CostNotFound);
        }
        Ok(())
    }
}
