//! Backend of the application.

pub mod services;
pub mod utils;
