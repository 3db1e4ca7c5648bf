//! Regional unit master data.

pub mod core;
mod endpoints;

pub use core::{
    NewRegional, Regional, create_regional, create_regional_table, get_regional_by_code,
    list_regionals, map_row_to_regional, set_regional_active, update_regional,
};
pub use endpoints::{
    create_regional_endpoint, deactivate_regional_endpoint, get_regionals_endpoint,
    update_regional_endpoint,
};
