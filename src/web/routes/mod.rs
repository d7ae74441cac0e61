pub mod auth;
pub mod system;
pub mod trash_cans;
pub mod users;
pub mod ws;
