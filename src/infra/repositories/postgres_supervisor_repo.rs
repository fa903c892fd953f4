use crate::domain::{models::user::SupervisorProfile, ports::SupervisorProfileRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSupervisorRepo {
    pool: PgPool,
}

impl PostgresSupervisorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupervisorProfileRepository for PostgresSupervisorRepo {
    async fn create(&self, profile: &SupervisorProfile) -> Result<SupervisorProfile, AppError> {
        sqlx::query_as::<_, SupervisorProfile>(
            "INSERT INTO supervisor_profiles (id, user_id, company_id, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
        )
            .bind(&profile.id)
            .bind(&profile.user_id)
            .bind(&profile.company_id)
            .bind(profile.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SupervisorProfile>, AppError> {
        sqlx::query_as::<_, SupervisorProfile>("SELECT * FROM supervisor_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<SupervisorProfile>, AppError> {
        sqlx::query_as::<_, SupervisorProfile>("SELECT * FROM supervisor_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
