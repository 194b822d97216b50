use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::EventRow;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let row = EventRow::from_domain(event)?;
        let saved = sqlx::query_as::<_, EventRow>(
            r#"INSERT INTO events (
                   id, slug, localizations, date, end_date, recurring, max_published,
                   currently_publishing, registration_allowed, rsvp_required,
                   registration_opens, registration_deadline, automatic_refund_deadline,
                   max_spots, price, member_price, payment_options, members_only,
                   min_age, max_age, gender, ministries, location_address, image_id,
                   hidden, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                       $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
               RETURNING *"#,
        )
        .bind(&row.id)
        .bind(&row.slug)
        .bind(&row.localizations)
        .bind(row.date)
        .bind(row.end_date)
        .bind(&row.recurring)
        .bind(row.max_published)
        .bind(row.currently_publishing)
        .bind(row.registration_allowed)
        .bind(row.rsvp_required)
        .bind(row.registration_opens)
        .bind(row.registration_deadline)
        .bind(row.automatic_refund_deadline)
        .bind(row.max_spots)
        .bind(row.price)
        .bind(row.member_price)
        .bind(&row.payment_options)
        .bind(row.members_only)
        .bind(row.min_age)
        .bind(row.max_age)
        .bind(&row.gender)
        .bind(&row.ministries)
        .bind(&row.location_address)
        .bind(&row.image_id)
        .bind(row.hidden)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        saved.into_domain()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(EventRow::into_domain).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(EventRow::into_domain).transpose()
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query_as::<_, EventRow>("SELECT * FROM events ORDER BY date ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        rows.into_iter().map(EventRow::into_domain).collect()
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let row = EventRow::from_domain(event)?;
        let saved = sqlx::query_as::<_, EventRow>(
            r#"UPDATE events SET
                   slug = $1, localizations = $2, date = $3, end_date = $4, recurring = $5,
                   max_published = $6, currently_publishing = $7, registration_allowed = $8,
                   rsvp_required = $9, registration_opens = $10, registration_deadline = $11,
                   automatic_refund_deadline = $12, max_spots = $13, price = $14,
                   member_price = $15, payment_options = $16, members_only = $17,
                   min_age = $18, max_age = $19, gender = $20, ministries = $21,
                   location_address = $22, image_id = $23, hidden = $24
               WHERE id = $25
               RETURNING *"#,
        )
        .bind(&row.slug)
        .bind(&row.localizations)
        .bind(row.date)
        .bind(row.end_date)
        .bind(&row.recurring)
        .bind(row.max_published)
        .bind(row.currently_publishing)
        .bind(row.registration_allowed)
        .bind(row.rsvp_required)
        .bind(row.registration_opens)
        .bind(row.registration_deadline)
        .bind(row.automatic_refund_deadline)
        .bind(row.max_spots)
        .bind(row.price)
        .bind(row.member_price)
        .bind(&row.payment_options)
        .bind(row.members_only)
        .bind(row.min_age)
        .bind(row.max_age)
        .bind(&row.gender)
        .bind(&row.ministries)
        .bind(&row.location_address)
        .bind(&row.image_id)
        .bind(row.hidden)
        .bind(&row.id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        saved.into_domain()
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }
}
