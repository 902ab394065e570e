//! Types shared by the paint shop server and game clients.

pub mod components;
pub mod paint;
pub mod player;
pub mod protocol;
pub mod shop;
pub mod vehicle;
pub mod vehicle_record;
pub mod zone;

pub use components::*;
pub use paint::*;
pub use player::*;
pub use protocol::*;
pub use shop::*;
pub use vehicle::*;
pub use vehicle_record::*;
pub use zone::*;
