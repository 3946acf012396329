pub mod admin;
pub mod health;
pub mod todos;
pub mod users;
