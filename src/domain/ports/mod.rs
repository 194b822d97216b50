use crate::domain::models::{
    auth::{Actor, Capability},
    event::Event,
    instance::{EventInstance, InstanceFilter, InstancePage},
    registration::{Registration, RegistrationSummary},
};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    /// Instances and registrations go with the event (cascade).
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait InstanceRepository: Send + Sync {
    async fn create(&self, instance: &EventInstance) -> Result<EventInstance, AppError>;
    async fn find(&self, event_id: &str, series_index: i32)
    -> Result<Option<EventInstance>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventInstance>, AppError>;
    async fn list_page(&self, event_id: &str, filter: InstanceFilter)
    -> Result<InstancePage, AppError>;
    async fn update(&self, instance: &EventInstance) -> Result<EventInstance, AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn create(&self, registration: &Registration) -> Result<Registration, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError>;
    async fn list_by_instance(
        &self,
        event_id: &str,
        series_index: i32,
    ) -> Result<Vec<Registration>, AppError>;
    async fn count_confirmed(&self, event_id: &str, series_index: i32) -> Result<i64, AppError>;
    async fn summarize(
        &self,
        event_id: &str,
        series_index: i32,
    ) -> Result<RegistrationSummary, AppError>;
    async fn cancel(&self, id: &str) -> Result<(), AppError>;
}

/// Resolves opaque media asset ids to displayable URLs. Lookup failures
/// degrade to a placeholder, never to an error.
#[async_trait]
pub trait MediaAssetResolver: Send + Sync {
    async fn resolve_url(&self, asset_id: &str) -> String;
}

/// Answers which of the requested capabilities the actor actually holds.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn granted(
        &self,
        actor: &Actor,
        requested: &[Capability],
    ) -> Result<HashSet<Capability>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str)
    -> Result<(), AppError>;
}
