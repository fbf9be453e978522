//! Model gateway implementations.

pub mod openai_compat;
