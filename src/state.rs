use crate::config::Config;
use crate::domain::ports::{
    EmailService, EventRepository, InstanceRepository, MediaAssetResolver, PermissionChecker,
    RegistrationRepository,
};
use std::sync::Arc;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_repo: Arc<dyn EventRepository>,
    pub instance_repo: Arc<dyn InstanceRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub media_resolver: Arc<dyn MediaAssetResolver>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub email_service: Arc<dyn EmailService>,
    pub templates: Arc<Tera>,
}
