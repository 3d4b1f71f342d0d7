pub mod availability;
pub mod booking;
pub mod classification;
pub mod roster_feed;
pub mod slots;
pub mod stats;

pub use availability::{resolve_availability, SlotAvailability, SlotState};
pub use booking::{check_booking, BookingService, ValidatedBooking};
pub use classification::{is_history, partition, AppointmentPartition};
pub use roster_feed::{RosterFeed, RosterSnapshot};
pub use slots::SlotCatalogue;
pub use stats::{monthly_breakdown, MonthlyBucket};
