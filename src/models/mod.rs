//! Favro API model types.

mod card;
mod collection;
mod column;
mod custom_field;
mod organization;
mod user;
mod webhook;
mod widget;

pub use card::*;
pub use collection::*;
pub use column::*;
pub use custom_field::*;
pub use organization::*;
pub use user::*;
pub use webhook::*;
pub use widget::*;
