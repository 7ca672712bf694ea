#[macro_use]
extern crate tracing;

pub mod animation;
pub mod cli;
pub mod scroller;
pub mod simulate;
pub mod utils;
