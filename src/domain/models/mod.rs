pub mod admin;
pub mod auth;
pub mod barber;
pub mod booking;
pub mod disabled_date;
pub mod service;
