pub mod geometry;
pub mod sync_table;

// Re-export for easier access
pub use geometry::resolve_geometry;
pub use sync_table::{
    DEFAULT_CLOCK_RATE, TIME_COLUMN, decode_sync_table, normalize_digital, sync_schema,
};
