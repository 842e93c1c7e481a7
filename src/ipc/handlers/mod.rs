pub mod attendance;
pub mod auth;
pub mod core;
pub mod students;
pub mod users;

mod params;
