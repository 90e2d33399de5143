use crate::domain::models::{barber::Barber, booking::Booking, service::Service};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Renders a confirmed booking as a single-event iCalendar document.
pub fn generate_ics(service: &Service, barber: &Barber, booking: &Booking) -> String {
    let mut calendar = Calendar::new();

    let description = format!(
        "{} with {} ({} min, {:.2} TND)",
        service.name_en, barber.name, service.duration_minutes, service.price_tnd
    );

    let event = IcalEvent::new()
        .summary(&format!("{} - {}", service.name_en, barber.name))
        .description(&description)
        .starts(booking.start_time)
        .ends(booking.end_time)
        .uid(&format!("{}@barbershop", booking.id))
        .done();

    calendar.push(event);
    calendar.to_string()
}
