// File-based surface around the draftkit engine: CSV loaders, the build
// pipeline, JSON export and the command-line interface.

pub mod cli;
pub mod commands;
pub mod diagnostics;
pub mod export;
pub mod loaders;
pub mod pipeline;
