// src/db/schedule_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::visits::Visit};

// A agenda em si (CRUD de consultas) vive em outra parte do sistema; o motor
// só lê os atendimentos como insumo dos cálculos.
#[derive(Clone)]
pub struct ScheduleRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atendimentos realizados e não cancelados na janela [start, end).
    pub async fn done_visits_between<'e, E>(
        &self,
        executor: E,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Visit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT id, service_id, scheduled_at, status, cancelled, value
            FROM visits
            WHERE scheduled_at >= $1 AND scheduled_at < $2
              AND status = 'DONE' AND cancelled = FALSE
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;

        Ok(visits)
    }
}
