pub mod booking;
pub mod event;
pub mod event_type;
pub mod venue;

pub use booking::{
    Booking, BookingDetails, BookingFilter, BookingForm, BookingListQuery, BookingSearch,
    BookingSearchQuery, NewBooking,
};
pub use event::{Event, EventDetails, EventForm, NewEvent};
pub use event_type::{EventType, EventTypeForm, NewEventType};
pub use venue::{NewVenue, Venue, VenueForm};
