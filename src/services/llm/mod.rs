//! LLM Boundary
//!
//! The opaque model-invoker interface and the shared variant cache:
//! - `invoker`: the `ModelInvoker` trait and invocation options
//! - `variants`: race-free get-or-create cache of override variants

pub mod invoker;
pub mod variants;

pub use invoker::{InvokeOptions, ModelInvoker, ModelOverrides};
pub use variants::ModelVariantCache;
