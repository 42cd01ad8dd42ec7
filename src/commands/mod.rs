//! The command tree built from directories of scripts
//!
//! Every directory becomes a group and every executable file a script. Scripts
//! describe themselves through annotation comments (see [`metadata`]), which
//! also decide how many positional arguments they accept (see [`usage`]).

pub mod metadata;
pub mod node;
pub mod tree;
pub mod usage;
