/*!
# pointviz

GPU buffer management for point-cloud and depth-map visualization.

This crate sits between host-side numeric data (nested sequences, dense
arrays, tensor-like objects) and a graphics backend. It normalizes input
into a fixed binary layout, tracks the size and capacity of each GPU
buffer, and decides on every update whether the existing allocation can be
reused or must be reallocated.

## Architecture

- **GraphicsDevice**: backend contract (handles, bind/unbind, allocate, upload),
  passed explicitly by `&mut` to every buffer operation
- **HostData**: closed set of accepted inputs (sequence, array, tensor)
- **Buffer**: one GPU array of `records × fields` scalars with capacity tracking
- **BufferManager**: named registry of buffers
- **Engine**: process-wide logger configuration

## Example

```no_run
use pointviz::pointviz::{PointvizResult, data::Buffer, device::{ElementType, GraphicsDevice}};

fn refresh(device: &mut dyn GraphicsDevice, depth: Vec<f32>) -> PointvizResult<()> {
    let mut colors = Buffer::with_shape(device, 0, 3, ElementType::Float32)?;
    colors.update_jet(device, depth)?;
    Ok(())
}
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod data;

// Main pointviz namespace module
pub mod pointviz {
    // Error types
    pub use crate::error::{PointvizError, PointvizResult};

    // Logging configuration
    pub use crate::engine::Engine;

    // Logging sub-module (types only; the engine_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend contract sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Buffer data sub-module
    pub mod data {
        pub use crate::data::*;
    }
}

// Re-export math library at crate root
pub use glam;
