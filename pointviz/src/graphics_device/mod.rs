/// Graphics device module - the backend contract and buffer descriptors

pub mod graphics_device;
pub mod buffer;

pub use graphics_device::*;
pub use buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
