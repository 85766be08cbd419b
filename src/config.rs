// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        BillingRepository, CatalogRepository, CostRepository, ScheduleRepository,
        SettingsRepository,
    },
    services::{
        CashFlowService, CostCatalogService, CostLedgerService, GoalService,
        ProfitabilityService, RealizedPeriodService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog_repo: CatalogRepository,
    pub billing_repo: BillingRepository,
    pub settings_repo: SettingsRepository,
    pub cost_catalog_service: CostCatalogService,
    pub cost_ledger_service: CostLedgerService,
    pub profitability_service: ProfitabilityService,
    pub realized_service: RealizedPeriodService,
    pub cashflow_service: CashFlowService,
    pub goal_service: GoalService,
}

impl AppState {
    // Carrega as configurações, abre o pool e monta os serviços
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;

        let db_pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                pool
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                return Err(e.into());
            }
        };

        let cost_repo = CostRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let schedule_repo = ScheduleRepository::new(db_pool.clone());
        let billing_repo = BillingRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let cost_catalog_service =
            CostCatalogService::new(cost_repo.clone(), catalog_repo.clone());
        let cost_ledger_service = CostLedgerService::new(cost_repo.clone());
        let profitability_service =
            ProfitabilityService::new(cost_repo.clone(), catalog_repo.clone());
        let realized_service =
            RealizedPeriodService::new(profitability_service.clone(), schedule_repo.clone());
        let cashflow_service = CashFlowService::new(
            cost_repo.clone(),
            billing_repo.clone(),
            schedule_repo.clone(),
            settings_repo.clone(),
        );
        let goal_service = GoalService::new(
            profitability_service.clone(),
            schedule_repo,
            settings_repo.clone(),
        );

        Ok(Self {
            db_pool,
            catalog_repo,
            billing_repo,
            settings_repo,
            cost_catalog_service,
            cost_ledger_service,
            profitability_service,
            realized_service,
            cashflow_service,
            goal_service,
        })
    }
}
