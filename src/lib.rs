pub mod config;
pub mod constants;
pub mod entities;
pub mod grid;
pub mod host_utils;
pub mod maze;
pub mod movement;
pub mod player;
pub mod rng;
pub mod session;
pub mod types;
