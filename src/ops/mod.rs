//! Request processing: listing, preconditions, ranges and write stamping

pub mod conditional;
pub mod list;
pub mod range;
pub mod stamp;

pub use conditional::{evaluate, Outcome};
pub use list::list_page;
pub use range::ByteRange;
pub use stamp::stamp;
