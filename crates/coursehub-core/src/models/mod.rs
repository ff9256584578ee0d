//! Data models for CourseHub backend payloads.
//!
//! - `Course`, `Lesson`: catalog entries
//! - `UserProfile`, `ProfileUpdate`: the logged-in account
//! - `Order`, `OrderReceipt`, `ActionResult`: purchases and action replies
//! - `access`: which lessons the current user may play

pub mod access;
pub mod course;
pub mod order;
pub mod user;

pub use access::{can_play, playback_access, PlaybackAccess};
pub use course::{Course, Lesson};
pub use order::{ActionResult, Order, OrderConfirm, OrderCreate, OrderReceipt, OrderStatus};
pub use user::{ProfileUpdate, UserProfile};
