pub mod cascade;
pub mod config;
pub mod deposit;
pub mod detector;
pub mod generator;
pub mod histogram;
pub mod lifecycle;
pub mod primary;
pub mod reducer;
pub mod result;
pub mod run;
pub mod sampling;
pub mod simulation;
pub mod transport;
pub mod worker;
