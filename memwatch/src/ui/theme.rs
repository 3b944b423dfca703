//! Shared UI theme constants.

use ratatui::style::Color;

// Chart series
pub const MEM_RSS: Color = Color::Magenta;
pub const MEM_HEAP_USED: Color = Color::Cyan;
pub const MEM_HEAP_TOTAL: Color = Color::Blue;
pub const MEM_EXTERNAL: Color = Color::Yellow;
pub const CPU_USER: Color = Color::Green;
pub const CPU_SYSTEM: Color = Color::Red;

// Badges
pub const OK: Color = Color::Green;
pub const BAD: Color = Color::Red;
pub const MUTED: Color = Color::Rgb(170, 170, 180);
