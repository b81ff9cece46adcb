pub mod ads;
pub mod auth;
pub mod categories;
pub mod selections;
pub mod users;
