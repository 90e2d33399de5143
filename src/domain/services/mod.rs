pub mod auth_service;
pub mod availability;
pub mod booking_service;
pub mod calendar;
pub mod schedule;
pub mod stepper;
pub mod validation;
