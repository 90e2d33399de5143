use std::sync::Arc;
use crate::domain::ports::AdminRepository;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::booking_service::BookingService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub auth_service: Arc<AuthService>,
    pub booking_service: Arc<BookingService>,
}
