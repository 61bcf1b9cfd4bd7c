pub mod check;
pub mod config;
pub mod map;
pub mod replay;
