/// Named buffer registry.
///
/// Holds the buffers a visualization layer refers to by name ("points",
/// "colors", "heights", ...) and forwards updates to them. Buffers keep
/// their backend handles when removed; teardown is the caller's job.

use std::collections::hash_map::Entry;
use rustc_hash::FxHashMap;

use crate::data::buffer::{Buffer, BufferConfig};
use crate::data::host_data::HostData;
use crate::error::{PointvizError, PointvizResult};
use crate::graphics_device::GraphicsDevice;
use crate::engine_bail;

/// Registry of named buffers
#[derive(Debug, Default)]
pub struct BufferManager {
    buffers: FxHashMap<String, Buffer>,
}

impl BufferManager {
    /// Create a new empty buffer manager
    pub fn new() -> Self {
        Self {
            buffers: FxHashMap::default(),
        }
    }

    /// Create a named buffer holding `data`
    ///
    /// # Errors
    ///
    /// Returns InvalidResource if the name is taken (nothing is allocated
    /// in that case), otherwise any error of `Buffer::new`.
    pub fn add_buffer<'a>(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        data: impl Into<HostData<'a>>,
        config: &BufferConfig,
    ) -> PointvizResult<&Buffer> {
        match self.buffers.entry(name.to_string()) {
            Entry::Occupied(_) => engine_bail!("pointviz::BufferManager",
                PointvizError::InvalidResource(format!("Buffer '{}' already exists", name))),
            Entry::Vacant(slot) => {
                let buffer = Buffer::new(device, data.into(), config)?;
                Ok(&*slot.insert(buffer))
            }
        }
    }

    /// Create a named `records × fields` placeholder
    ///
    /// # Errors
    ///
    /// Returns InvalidResource if the name is taken, otherwise any error of
    /// `Buffer::placeholder`.
    pub fn add_placeholder(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        records: usize,
        fields: usize,
        config: &BufferConfig,
    ) -> PointvizResult<&Buffer> {
        match self.buffers.entry(name.to_string()) {
            Entry::Occupied(_) => engine_bail!("pointviz::BufferManager",
                PointvizError::InvalidResource(format!("Buffer '{}' already exists", name))),
            Entry::Vacant(slot) => {
                let buffer = Buffer::placeholder(device, records, fields, config)?;
                Ok(&*slot.insert(buffer))
            }
        }
    }

    /// Update a named buffer (see `Buffer::update`)
    pub fn update_buffer<'a>(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        data: impl Into<HostData<'a>>,
    ) -> PointvizResult<()> {
        self.named_mut(name)?.update(device, data)
    }

    /// Colormap-update a named buffer (see `Buffer::update_jet`)
    pub fn update_buffer_jet<'a>(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        data: impl Into<HostData<'a>>,
    ) -> PointvizResult<()> {
        self.named_mut(name)?.update_jet(device, data)
    }

    /// Reset a named buffer's record count to zero
    pub fn clear_buffer(&mut self, name: &str) -> PointvizResult<()> {
        self.named_mut(name)?.clear();
        Ok(())
    }

    fn named_mut(&mut self, name: &str) -> PointvizResult<&mut Buffer> {
        match self.buffers.get_mut(name) {
            Some(buffer) => Ok(buffer),
            None => engine_bail!("pointviz::BufferManager",
                PointvizError::InvalidResource(format!("Buffer '{}' not found", name))),
        }
    }

    /// Get a buffer by name
    pub fn buffer(&self, name: &str) -> Option<&Buffer> {
        self.buffers.get(name)
    }

    /// Get a mutable buffer by name
    pub fn buffer_mut(&mut self, name: &str) -> Option<&mut Buffer> {
        self.buffers.get_mut(name)
    }

    /// Remove a buffer by name
    ///
    /// The returned buffer still owns its backend handle.
    pub fn remove_buffer(&mut self, name: &str) -> Option<Buffer> {
        self.buffers.remove(name)
    }

    /// Get the number of buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Get all buffer names
    pub fn buffer_names(&self) -> Vec<&str> {
        self.buffers.keys().map(|k| k.as_str()).collect()
    }

    /// Clear every buffer (nothing is removed)
    pub fn clear_all(&mut self) {
        self.buffers.values_mut().for_each(Buffer::clear);
    }

    /// Sum of `size()` over all buffers
    pub fn total_size(&self) -> u64 {
        self.buffers.values().map(Buffer::size).sum()
    }
}

#[cfg(test)]
#[path = "buffer_manager_tests.rs"]
mod tests;
