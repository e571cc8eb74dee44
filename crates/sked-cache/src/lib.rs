//! Local cache of the timetable spreadsheet.
//!
//! Each tab of the spreadsheet is downloaded as CSV into its own file, and a
//! [`GroupIndex`] maps every group code found in a tab's header to that
//! file. [`ScheduleCache`] owns both and exposes the operations the front end
//! calls: startup fill, periodic refresh, and group lookup.

mod fetch;
mod index;
mod service;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use fetch::{DEFAULT_EXPORT_BASE, FETCH_TIMEOUT, Gid, HttpFetcher, SheetSource};
pub use index::{GroupIndex, codes_in_header};
pub use service::ScheduleCache;
pub use store::{CacheStore, MAX_IN_FLIGHT, gid_from_file_name};
