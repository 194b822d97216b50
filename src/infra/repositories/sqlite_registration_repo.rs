use crate::domain::{
    models::registration::{Registration, RegistrationSummary},
    ports::RegistrationRepository,
};
use crate::error::AppError;
use crate::infra::repositories::rows::{RegistrationRow, SummaryRow};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteRegistrationRepo {
    pool: SqlitePool,
}

impl SqliteRegistrationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for SqliteRegistrationRepo {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError> {
        let row = RegistrationRow::from_domain(registration);
        let saved = sqlx::query_as::<_, RegistrationRow>(
            r#"INSERT INTO registrations (
                   id, event_id, series_index, attendee_name, attendee_email, member,
                   age, gender, status, payment_status, payment_option, amount_due,
                   amount_paid, management_token, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(&row.id)
        .bind(&row.event_id)
        .bind(row.series_index)
        .bind(&row.attendee_name)
        .bind(&row.attendee_email)
        .bind(row.member)
        .bind(row.age)
        .bind(&row.gender)
        .bind(&row.status)
        .bind(&row.payment_status)
        .bind(&row.payment_option)
        .bind(row.amount_due)
        .bind(row.amount_paid)
        .bind(&row.management_token)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        saved.into_domain()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError> {
        let row = sqlx::query_as::<_, RegistrationRow>("SELECT * FROM registrations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(RegistrationRow::into_domain).transpose()
    }

    async fn list_by_instance(
        &self,
        event_id: &str,
        series_index: i32,
    ) -> Result<Vec<Registration>, AppError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            "SELECT * FROM registrations WHERE event_id = ? AND series_index = ? \
             ORDER BY created_at ASC",
        )
        .bind(event_id)
        .bind(series_index)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(RegistrationRow::into_domain).collect()
    }

    async fn count_confirmed(&self, event_id: &str, series_index: i32) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations \
             WHERE event_id = ? AND series_index = ? AND status = 'confirmed'",
        )
        .bind(event_id)
        .bind(series_index)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn summarize(
        &self,
        event_id: &str,
        series_index: i32,
    ) -> Result<RegistrationSummary, AppError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"SELECT COUNT(*) AS seats_filled,
                      COALESCE(SUM(amount_due), 0) AS amount_due_total,
                      COALESCE(SUM(amount_paid), 0) AS amount_paid_total
               FROM registrations
               WHERE event_id = ? AND series_index = ? AND status = 'confirmed'"#,
        )
        .bind(event_id)
        .bind(series_index)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.into())
    }

    async fn cancel(&self, id: &str) -> Result<(), AppError> {
        let res = sqlx::query(
            "UPDATE registrations SET status = 'cancelled' WHERE id = ? AND status = 'confirmed'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Registration not found".into()));
        }
        Ok(())
    }
}
