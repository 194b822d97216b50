use crate::domain::{
    models::instance::{EventInstance, InstanceFilter, InstancePage, InstanceStatus, SortOrder},
    ports::InstanceRepository,
};
use crate::error::AppError;
use crate::infra::repositories::rows::InstanceRow;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresInstanceRepo {
    pool: PgPool,
}

impl PostgresInstanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_clause(status: InstanceStatus) -> &'static str {
    match status {
        InstanceStatus::All => "",
        InstanceStatus::Upcoming => " AND target_date >= $2",
        InstanceStatus::Past => " AND target_date < $2",
    }
}

#[async_trait]
impl InstanceRepository for PostgresInstanceRepo {
    async fn create(&self, instance: &EventInstance) -> Result<EventInstance, AppError> {
        let row = InstanceRow::from_domain(instance)?;
        let saved = sqlx::query_as::<_, InstanceRow>(
            r#"INSERT INTO event_instances (
                   id, event_id, series_index, target_date, overrides_mask,
                   localizations, location, image, schedule, registration,
                   eligibility, visibility, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
               RETURNING *"#,
        )
        .bind(&row.id)
        .bind(&row.event_id)
        .bind(row.series_index)
        .bind(row.target_date)
        .bind(row.overrides_mask)
        .bind(&row.localizations)
        .bind(&row.location)
        .bind(&row.image)
        .bind(&row.schedule)
        .bind(&row.registration)
        .bind(&row.eligibility)
        .bind(&row.visibility)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        saved.into_domain()
    }

    async fn find(
        &self,
        event_id: &str,
        series_index: i32,
    ) -> Result<Option<EventInstance>, AppError> {
        let row = sqlx::query_as::<_, InstanceRow>(
            "SELECT * FROM event_instances WHERE event_id = $1 AND series_index = $2",
        )
        .bind(event_id)
        .bind(series_index)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        row.map(InstanceRow::into_domain).transpose()
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventInstance>, AppError> {
        let rows = sqlx::query_as::<_, InstanceRow>(
            "SELECT * FROM event_instances WHERE event_id = $1 ORDER BY series_index ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(InstanceRow::into_domain).collect()
    }

    async fn list_page(
        &self,
        event_id: &str,
        filter: InstanceFilter,
    ) -> Result<InstancePage, AppError> {
        let direction = match filter.sort {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let clause = status_clause(filter.status);
        let offset = (filter.page.max(1) - 1) * filter.limit;

        let (limit_param, offset_param) = if filter.status == InstanceStatus::All {
            ("$2", "$3")
        } else {
            ("$3", "$4")
        };
        let select = format!(
            "SELECT * FROM event_instances WHERE event_id = $1{clause} \
             ORDER BY target_date {direction} LIMIT {limit_param} OFFSET {offset_param}"
        );
        let count = format!("SELECT COUNT(*) FROM event_instances WHERE event_id = $1{clause}");

        let mut select_query = sqlx::query_as::<_, InstanceRow>(&select).bind(event_id);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count).bind(event_id);
        if filter.status != InstanceStatus::All {
            select_query = select_query.bind(filter.reference);
            count_query = count_query.bind(filter.reference);
        }

        let rows = select_query
            .bind(filter.limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let items = rows
            .into_iter()
            .map(InstanceRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InstancePage { items, total })
    }

    async fn update(&self, instance: &EventInstance) -> Result<EventInstance, AppError> {
        let row = InstanceRow::from_domain(instance)?;
        let saved = sqlx::query_as::<_, InstanceRow>(
            r#"UPDATE event_instances SET
                   target_date = $1, overrides_mask = $2, localizations = $3, location = $4,
                   image = $5, schedule = $6, registration = $7, eligibility = $8,
                   visibility = $9, updated_at = $10
               WHERE event_id = $11 AND series_index = $12
               RETURNING *"#,
        )
        .bind(row.target_date)
        .bind(row.overrides_mask)
        .bind(&row.localizations)
        .bind(&row.location)
        .bind(&row.image)
        .bind(&row.schedule)
        .bind(&row.registration)
        .bind(&row.eligibility)
        .bind(&row.visibility)
        .bind(row.updated_at)
        .bind(&row.event_id)
        .bind(row.series_index)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        saved.into_domain()
    }
}
