// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::catalog::ServiceType};

#[derive(Clone)]
pub struct CatalogRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        name: &str,
        price: Decimal,
    ) -> Result<ServiceType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, ServiceType>(
            r#"
            INSERT INTO service_types (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(price)
        .fetch_one(executor)
        .await?;

        Ok(service)
    }

    pub async fn list_active_services<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<ServiceType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let services = sqlx::query_as::<_, ServiceType>(
            "SELECT id, name, price, is_active, created_at
             FROM service_types
             WHERE is_active = TRUE
             ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(services)
    }
}
