//! Data Transfer Objects - Shapes that cross the model boundary
//!
//! DTOs live in the application layer so the loosely typed model draft never
//! leaks into the domain model.

mod draft;

pub use draft::{
    as_list, coerce_chance, coerce_number, coerce_u32, dedup_preserving_order, non_empty_str,
    scalar_object, string_list, whitelist, Draft,
};
