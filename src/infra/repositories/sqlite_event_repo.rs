use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use crate::infra::repositories::rows::EventRow;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
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
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
        let row = sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.map(EventRow::into_domain).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE slug = ?")
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
                   slug = ?, localizations = ?, date = ?, end_date = ?, recurring = ?,
                   max_published = ?, currently_publishing = ?, registration_allowed = ?,
                   rsvp_required = ?, registration_opens = ?, registration_deadline = ?,
                   automatic_refund_deadline = ?, max_spots = ?, price = ?, member_price = ?,
                   payment_options = ?, members_only = ?, min_age = ?, max_age = ?,
                   gender = ?, ministries = ?, location_address = ?, image_id = ?, hidden = ?
               WHERE id = ?
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
        let res = sqlx::query("DELETE FROM events WHERE id = ?")
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
