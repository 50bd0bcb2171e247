//! Buffer data module
//!
//! Host input variants, normalization into the canonical layout, the JET
//! colormap, GPU-backed buffers with capacity tracking, and a named
//! buffer registry.

pub mod host_data;
pub mod colormap;
mod normalize;
mod buffer;
mod buffer_manager;

pub use host_data::{
    ArrayData, Element, HostArray, HostData, Scalar, Sequence, TensorDevice, TensorLike,
};
pub use normalize::normalize;
pub use buffer::{Buffer, BufferConfig, BufferSource, GrowthPolicy};
pub use buffer_manager::BufferManager;
