pub mod health;
pub mod readings;
