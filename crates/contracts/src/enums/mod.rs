pub mod component_field;

pub use component_field::ComponentField;
