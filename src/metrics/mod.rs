//! Metrics calculation module
//!
//! Line counts and the path classifications the length rules depend on.

pub mod loc_counter;

pub use loc_counter::{
    count_lines, is_component_path, is_config_path, is_test_path, round_to, LocCount,
};
