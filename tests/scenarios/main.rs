//! End-to-end scenarios over the game-object fixtures registered in the global registry.

mod common;

mod concurrency;
mod enums;
mod inheritance;
mod invoke;
mod round_trip;
