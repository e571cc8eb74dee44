//! Core types for the sked timetable pipeline.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies. It
//! owns the lesson record shape, the week-parity calendar and the text
//! renderer; the CSV parser and the cache build on top of it.

pub mod calendar;
pub mod error;
pub mod group;
pub mod lesson;
pub mod render;

pub use error::{Error, Result};
pub use group::GroupCode;
pub use lesson::{LessonRecord, WeekParity};
