pub mod constants;
pub mod controller;
pub mod engine;
pub mod input;
pub mod keyboard;
pub mod level;
pub mod levels;
pub mod logging;
pub mod presenters;
pub mod rng;
pub mod scheduler;
pub mod types;
