pub mod measure;
pub mod records;
pub mod snapshot;

// Re-export the main types for easy access
pub use measure::{
    format_handle_time,
    parse_handle_time,
};
pub use records::*;
pub use snapshot::*;
