//! Derives the Chinese lunisolar calendar (modern version) from astronomical
//! events: the 24 solar terms and the phases of the moon.
//!
//! Both event streams are computed on the fly by an [`Ephemeris`](ephemeris::Ephemeris);
//! the built-in [`Analytic`](ephemeris::Analytic) model covers 1700 to 2200.
//!
//! # Examples
//!
//! Basic usage with [`Date`]:
//!
//! ```
//! use nongli::Date;
//!
//! let date = Date::from_gregorian(2000, 1, 1).unwrap();
//!
//! assert_eq!(6, date.day_of_week()); // Saturday
//! assert_eq!(2451545, date.jdn());
//! ```
//!
//! Chinese lunisolar calendar:
//!
//! ```
//! use nongli::{Calendar, CalendarConfig};
//!
//! let calendar = Calendar::new(CalendarConfig::default()).unwrap();
//! let year = calendar.build(2023).unwrap();
//!
//! let names: Vec<_> = year.iter().map(|month| month.name.as_str()).collect();
//! assert_eq!(13, names.len());
//! assert_eq!("閏二月", names[2]);
//! ```
//!
//! Civil days are counted in one fixed timezone, UTC+8 unless configured
//! otherwise through [`CalendarConfig`].

pub mod chinese;
pub mod config;
pub mod date;
pub mod ephemeris;
pub mod error;
pub mod time_scales;

pub use chinese::Calendar;
pub use config::CalendarConfig;
pub use date::Date;
pub use error::{CalendarError, Result};
