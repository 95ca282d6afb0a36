pub mod link;
pub mod permission;
pub mod room;
pub mod user;
