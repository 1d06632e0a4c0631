//! Domain core of the practice-exam player: the adaptive session engine, screen
//! timers, scoring and the score record shape.
#![forbid(unsafe_code)]

pub mod adaptive;
pub mod model;
pub mod scoring;
pub mod time;
pub mod timer;

pub use adaptive::{AdaptiveSession, Module, Phase, SessionSnapshot};
pub use scoring::{BandScore, Branch};
pub use time::Clock;
pub use timer::{Countdown, CountdownTick, Stopwatch};
