pub mod footprint;
pub mod template;
