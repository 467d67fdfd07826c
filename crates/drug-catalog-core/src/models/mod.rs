//! Domain models for the drug catalog.

mod category;
mod drug;
mod reminder;
mod schedule;
mod user;

pub use category::*;
pub use drug::*;
pub use reminder::*;
pub use schedule::*;
pub use user::*;
