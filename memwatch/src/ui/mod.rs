//! UI module root: exposes drawing functions for individual panels.

pub mod cards;
pub mod cpu;
pub mod endpoint;
pub mod header;
pub mod info;
pub mod mem;
pub mod theme;
pub mod util;
