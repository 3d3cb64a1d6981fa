pub mod admin_user;
pub mod enums;
pub mod filters;
pub mod patient;
pub mod submission;
pub mod test_result;

pub use admin_user::*;
pub use enums::*;
pub use filters::*;
pub use patient::*;
pub use submission::*;
pub use test_result::*;
