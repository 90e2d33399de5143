pub mod sqlite_admin_repo;
pub mod sqlite_barber_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_disabled_date_repo;
pub mod sqlite_service_repo;

pub mod postgres_admin_repo;
pub mod postgres_barber_repo;
pub mod postgres_booking_repo;
pub mod postgres_disabled_date_repo;
pub mod postgres_service_repo;
