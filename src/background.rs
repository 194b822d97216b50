use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, error, info, info_span};

use crate::domain::services::materializer::plan_materialization;
use crate::error::AppError;
use crate::state::AppState;

const MATERIALIZE_INTERVAL: Duration = Duration::from_secs(60);

/// Keeps the materialized instance window topped up as time passes. One pass
/// per tick; a failing event is logged and skipped, the rest still run.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting instance materializer worker...");

    loop {
        match state.event_repo.list().await {
            Ok(events) => {
                for event in events {
                    let span = info_span!(
                        "materialize_event",
                        event_id = %event.id,
                        slug = %event.slug
                    );

                    let state = state.clone();
                    async move {
                        match materialize_event(&state, &event.id).await {
                            Ok(0) => {}
                            Ok(count) => info!("Materialized {} new instance(s)", count),
                            Err(e) => error!("Materialization failed: {:?}", e),
                        }
                    }
                    .instrument(span)
                    .await;
                }
            }
            Err(e) => error!("Failed to list events for materialization: {:?}", e),
        }
        sleep(MATERIALIZE_INTERVAL).await;
    }
}

async fn materialize_event(state: &AppState, event_id: &str) -> Result<usize, AppError> {
    let event = state
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let existing = state.instance_repo.list_by_event(&event.id).await?;
    let planned = plan_materialization(&event, &existing, Utc::now());
    for instance in &planned {
        state.instance_repo.create(instance).await?;
    }
    Ok(planned.len())
}
