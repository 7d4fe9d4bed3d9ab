//! Terminal journal. Whatever you write is kept only if you stop typing long enough for the
//! life bar to run out, at which point it is committed as the next numbered file in the
//! writings directory.
//!

pub mod cli;
pub mod session;
pub mod storage;
pub mod tui;
pub mod utils;
