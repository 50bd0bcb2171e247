/// GraphicsDevice trait - the backend contract buffers are written against

use crate::error::PointvizResult;
use crate::graphics_device::{BufferDesc, BufferHandle};

/// Graphics backend context
///
/// Implemented by the rendering backend (an OpenGL context, a wgpu queue
/// wrapper, a recording mock). The device is passed by `&mut` reference to
/// every buffer operation; nothing in this crate keeps an implicit "current
/// context". Implementations are expected to live on the thread that owns
/// the graphics context, so the trait requires neither Send nor Sync.
pub trait GraphicsDevice {
    /// Allocate a new buffer handle (no storage attached yet)
    fn allocate_handle(&mut self) -> PointvizResult<BufferHandle>;

    /// Return `handle` and any storage behind it to the backend
    ///
    /// Only called for handles that never reached the caller (a buffer
    /// whose construction failed). Live buffers are torn down externally.
    fn release_handle(&mut self, handle: BufferHandle);

    /// Make `handle` the current buffer
    fn bind_buffer(&mut self, handle: BufferHandle) -> PointvizResult<()>;

    /// Release the current buffer binding
    fn unbind_buffer(&mut self);

    /// (Re)allocate the storage behind `handle`
    ///
    /// Replaces any previous storage. `initial_data`, when present, fills
    /// the start of the new allocation and is at most `desc.size` bytes.
    fn allocate_storage(
        &mut self,
        handle: BufferHandle,
        desc: &BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> PointvizResult<()>;

    /// Overwrite `data.len()` bytes of the storage starting at `offset`
    ///
    /// Must fail rather than write past the allocated size.
    fn upload_sub_range(&mut self, handle: BufferHandle, offset: u64, data: &[u8]) -> PointvizResult<()>;
}

/// Run `op` with `handle` bound, unbinding afterwards even if `op` fails
pub fn with_bound<R>(
    device: &mut dyn GraphicsDevice,
    handle: BufferHandle,
    op: impl FnOnce(&mut dyn GraphicsDevice) -> PointvizResult<R>,
) -> PointvizResult<R> {
    device.bind_buffer(handle)?;
    let result = op(&mut *device);
    device.unbind_buffer();
    result
}
