pub mod id;
pub mod names;

pub use id::prefixed_ulid;
pub use names::normalize_room_name;
