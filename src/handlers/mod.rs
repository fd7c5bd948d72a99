pub mod auth;
pub mod recipes;
pub mod social;
pub mod uploads;
