pub mod commands;
pub mod model;
pub mod password;
pub mod session;
