// Library root: the projection and ranking engine.
//
// Everything in this crate is pure and synchronous. File loading, CLI
// parsing and JSON export live in `draftkit-app`.

pub mod config;
pub mod overrides;
pub mod player;
pub mod position;
pub mod stats;
pub mod valuation;
