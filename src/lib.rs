pub mod ai;
pub mod autopilot;
pub mod config;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod error;
pub mod maze;
pub mod power;
pub mod render;
pub mod rng;
pub mod score;
pub mod store;
pub mod timers;
pub mod types;
