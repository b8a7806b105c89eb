//! draftwork: contract document assembly
//!
//! Selects clause fragments by agreement variant, builds template contexts
//! from the contracting parties and renders a complete document tree.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
