/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Keeps every allocation as a plain byte vector, records an event log of
/// all backend calls, and enforces the contract real backends rely on:
/// operations target the bound handle and uploads stay inside the allocation.

use slotmap::SlotMap;

use crate::engine_bail;
use crate::error::{PointvizError, PointvizResult};
use crate::graphics_device::{
    BufferDesc, BufferHandle, BufferUsage, ElementType, GraphicsDevice,
};

// ============================================================================
// Mock events
// ============================================================================

/// One backend call, as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    AllocateHandle(BufferHandle),
    ReleaseHandle(BufferHandle),
    Bind(BufferHandle),
    Unbind,
    AllocateStorage {
        handle: BufferHandle,
        size: u64,
        usage: BufferUsage,
        element_type: ElementType,
        with_data: bool,
    },
    UploadSubRange {
        handle: BufferHandle,
        offset: u64,
        len: u64,
    },
}

// ============================================================================
// Mock storage
// ============================================================================

#[derive(Debug, Default)]
struct MockStorage {
    desc: Option<BufferDesc>,
    bytes: Vec<u8>,
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// In-memory GraphicsDevice that tracks allocations and uploads
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    buffers: SlotMap<BufferHandle, MockStorage>,
    bound: Option<BufferHandle>,
    events: Vec<MockEvent>,
    /// Upper bound on the sum of all allocation sizes
    memory_limit: Option<u64>,
    /// Refuse the next allocate_storage call
    fail_next_allocation: bool,
    /// Refuse every allocate_handle call
    fail_handle_allocation: bool,
}

impl MockGraphicsDevice {
    /// Create a new mock device with no memory limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock device that refuses allocations beyond `bytes` in total
    pub fn with_memory_limit(bytes: u64) -> Self {
        Self {
            memory_limit: Some(bytes),
            ..Self::default()
        }
    }

    /// Make the next allocate_storage call fail
    pub fn fail_next_allocation(&mut self) {
        self.fail_next_allocation = true;
    }

    /// Make allocate_handle fail (or succeed again)
    pub fn set_fail_handle_allocation(&mut self, fail: bool) {
        self.fail_handle_allocation = fail;
    }

    /// All events recorded so far
    pub fn events(&self) -> &[MockEvent] {
        &self.events
    }

    /// Forget recorded events (allocations are kept)
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Currently bound handle
    pub fn bound(&self) -> Option<BufferHandle> {
        self.bound
    }

    /// Number of live handles
    pub fn handle_count(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes currently stored behind `handle`
    pub fn storage(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(handle).map(|s| s.bytes.as_slice())
    }

    /// Descriptor of the current allocation behind `handle`
    pub fn storage_desc(&self, handle: BufferHandle) -> Option<&BufferDesc> {
        self.buffers.get(handle).and_then(|s| s.desc.as_ref())
    }

    /// Sum of all allocation sizes
    pub fn total_allocated(&self) -> u64 {
        self.buffers.values().map(|s| s.bytes.len() as u64).sum()
    }

    /// Number of allocate_storage events recorded for `handle`
    pub fn allocation_count(&self, handle: BufferHandle) -> usize {
        self.events.iter()
            .filter(|e| matches!(e, MockEvent::AllocateStorage { handle: h, .. } if *h == handle))
            .count()
    }

    /// Byte lengths of the upload_sub_range events recorded for `handle`
    pub fn upload_lengths(&self, handle: BufferHandle) -> Vec<u64> {
        self.events.iter()
            .filter_map(|e| match e {
                MockEvent::UploadSubRange { handle: h, len, .. } if *h == handle => Some(*len),
                _ => None,
            })
            .collect()
    }

    fn check_bound(&self, handle: BufferHandle, op: &str) -> PointvizResult<()> {
        if self.bound != Some(handle) {
            engine_bail!("pointviz::mock",
                PointvizError::BackendError(format!("{}: buffer {:?} is not bound", op, handle)));
        }
        Ok(())
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn allocate_handle(&mut self) -> PointvizResult<BufferHandle> {
        if self.fail_handle_allocation {
            engine_bail!("pointviz::mock",
                PointvizError::BackendAllocationFailure("handle allocation refused".to_string()));
        }
        let handle = self.buffers.insert(MockStorage::default());
        self.events.push(MockEvent::AllocateHandle(handle));
        Ok(handle)
    }

    fn release_handle(&mut self, handle: BufferHandle) {
        if self.buffers.remove(handle).is_some() {
            if self.bound == Some(handle) {
                self.bound = None;
            }
            self.events.push(MockEvent::ReleaseHandle(handle));
        }
    }

    fn bind_buffer(&mut self, handle: BufferHandle) -> PointvizResult<()> {
        if !self.buffers.contains_key(handle) {
            engine_bail!("pointviz::mock",
                PointvizError::BackendError(format!("bind: unknown buffer {:?}", handle)));
        }
        self.bound = Some(handle);
        self.events.push(MockEvent::Bind(handle));
        Ok(())
    }

    fn unbind_buffer(&mut self) {
        self.bound = None;
        self.events.push(MockEvent::Unbind);
    }

    fn allocate_storage(
        &mut self,
        handle: BufferHandle,
        desc: &BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> PointvizResult<()> {
        self.check_bound(handle, "allocate_storage")?;

        if self.fail_next_allocation {
            self.fail_next_allocation = false;
            engine_bail!("pointviz::mock",
                PointvizError::BackendAllocationFailure(format!("allocation of {} bytes refused", desc.size)));
        }
        if let Some(limit) = self.memory_limit {
            let previous = self.buffers[handle].bytes.len() as u64;
            let requested = self.total_allocated() - previous + desc.size;
            if requested > limit {
                engine_bail!("pointviz::mock",
                    PointvizError::BackendAllocationFailure(format!(
                        "out of memory: {} bytes requested, limit {}", requested, limit)));
            }
        }
        if let Some(data) = initial_data {
            if data.len() as u64 > desc.size {
                engine_bail!("pointviz::mock",
                    PointvizError::BackendError(format!(
                        "initial data of {} bytes exceeds allocation of {}", data.len(), desc.size)));
            }
        }

        let mut bytes = vec![0u8; desc.size as usize];
        if let Some(data) = initial_data {
            bytes[..data.len()].copy_from_slice(data);
        }
        let storage = &mut self.buffers[handle];
        storage.bytes = bytes;
        storage.desc = Some(desc.clone());

        self.events.push(MockEvent::AllocateStorage {
            handle,
            size: desc.size,
            usage: desc.usage,
            element_type: desc.element_type,
            with_data: initial_data.is_some(),
        });
        Ok(())
    }

    fn upload_sub_range(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> PointvizResult<()> {
        self.check_bound(handle, "upload_sub_range")?;

        let storage = &mut self.buffers[handle];
        let end = offset + data.len() as u64;
        if end > storage.bytes.len() as u64 {
            engine_bail!("pointviz::mock",
                PointvizError::BackendError(format!(
                    "upload of {} bytes at offset {} exceeds allocation of {}",
                    data.len(), offset, storage.bytes.len())));
        }
        storage.bytes[offset as usize..end as usize].copy_from_slice(data);

        self.events.push(MockEvent::UploadSubRange {
            handle,
            offset,
            len: data.len() as u64,
        });
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
