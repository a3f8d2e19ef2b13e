pub mod detail_overlay;
pub mod footer;
pub mod grid;
pub mod header;
pub mod render;
pub mod spinner;
