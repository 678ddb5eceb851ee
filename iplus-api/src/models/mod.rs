pub mod enums;
pub mod user;
pub mod skill;
pub mod inspire;
pub mod listing;
pub mod comms;
pub mod rating;

pub use enums::*;
pub use user::*;
pub use skill::*;
pub use inspire::*;
pub use listing::*;
pub use comms::*;
pub use rating::*;
