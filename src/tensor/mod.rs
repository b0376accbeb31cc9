//! Tensor data type utilities

pub mod dtype;

pub use dtype::{dtype_size, i32_to_dtype, is_castable, is_float_type, is_int_type};
