/// GPU attribute buffer with capacity tracking.
///
/// A Buffer owns one backend handle and a logical array of `record_count`
/// records of `field_count` scalars, stored as `element_type`.
///
/// Architecture:
/// - Every payload goes through `normalize()` first (canonical type, rank >= 2)
/// - Growth (`record_count > capacity`) reallocates backend storage
/// - Everything else is an in-place upload at offset 0
/// - `size()` is always derived, never cached
///
/// Failed calls leave `record_count`, `field_count` and `capacity` untouched:
/// the payload is normalized and validated, the device is driven, and only
/// then is the new state committed.

use crate::data::colormap;
use crate::data::host_data::{HostArray, HostData};
use crate::data::normalize::normalize;
use crate::error::{PointvizError, PointvizResult};
use crate::graphics_device::{
    with_bound, BufferDesc, BufferFormat, BufferHandle, BufferUsage, ElementType, GraphicsDevice,
};
use crate::{engine_bail, engine_debug, engine_trace, engine_warn};

// ===== GROWTH POLICY =====

/// How capacity grows when a payload no longer fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Reallocate to exactly the new record count, payload as initial data
    #[default]
    Exact,
    /// Reallocate to `max(records, 2 × capacity)`, then upload the payload
    Doubling,
}

// ===== BUFFER CONFIG =====

/// Construction parameters of a Buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Canonical scalar type every payload is coerced to
    pub element_type: ElementType,
    /// Draw-frequency hint forwarded on every allocation
    pub usage: BufferUsage,
    /// Capacity growth strategy when a payload no longer fits
    pub growth: GrowthPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            element_type: ElementType::Float32,
            usage: BufferUsage::Static,
            growth: GrowthPolicy::Exact,
        }
    }
}

impl BufferConfig {
    /// Default config with a given element type
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }
}

// ===== BUFFER SOURCE =====

/// What a Buffer is created from: real data, or a placeholder shape
#[derive(Debug)]
pub enum BufferSource<'a> {
    Data(HostData<'a>),
    Shape { records: usize, fields: usize },
}

impl<'a> From<HostData<'a>> for BufferSource<'a> {
    fn from(data: HostData<'a>) -> Self {
        BufferSource::Data(data)
    }
}

// ===== BUFFER =====

/// GPU-resident array of `record_count × field_count` scalars
#[derive(Debug)]
pub struct Buffer {
    handle: BufferHandle,
    element_type: ElementType,
    usage: BufferUsage,
    growth: GrowthPolicy,
    record_count: usize,
    field_count: usize,
    capacity: usize,
}

impl Buffer {
    /// Create a buffer from data or a placeholder shape
    ///
    /// A backend handle is allocated in every case. Real data is normalized
    /// first and uploaded with a storage allocation sized to its record count.
    pub fn create(
        device: &mut dyn GraphicsDevice,
        source: BufferSource<'_>,
        config: &BufferConfig,
    ) -> PointvizResult<Self> {
        match source {
            BufferSource::Data(data) => Self::new(device, data, config),
            BufferSource::Shape { records, fields } => Self::placeholder(device, records, fields, config),
        }
    }

    /// Create a buffer holding `data`
    ///
    /// # Errors
    ///
    /// Normalization errors (the handle is not allocated in that case) and
    /// backend allocation failures (the handle is released again).
    pub fn new(device: &mut dyn GraphicsDevice, data: HostData<'_>, config: &BufferConfig) -> PointvizResult<Self> {
        let array = normalize(data, config.element_type)?;

        let mut buffer = Self::with_handle(device, config, array.field_count())?;
        match buffer.write(device, &array) {
            Ok(()) => Ok(buffer),
            Err(err) => Err(buffer.discard(device, err)),
        }
    }

    /// Create a buffer holding `data` with the default config for `element_type`
    pub fn with_data<'a>(
        device: &mut dyn GraphicsDevice,
        data: impl Into<HostData<'a>>,
        element_type: ElementType,
    ) -> PointvizResult<Self> {
        Self::new(device, data.into(), &BufferConfig::new(element_type))
    }

    /// Create an empty placeholder of `records × fields`
    ///
    /// With `records == 0` no storage is allocated and `fields` stays
    /// provisional until the first non-empty update. Otherwise storage for
    /// `records` records is allocated (zeroed by the device, no upload).
    ///
    /// # Errors
    ///
    /// Returns UnsupportedInputType if `fields` is 0, BackendAllocationFailure
    /// if the storage is refused or its byte size overflows. The handle is
    /// released again on storage failures.
    pub fn placeholder(
        device: &mut dyn GraphicsDevice,
        records: usize,
        fields: usize,
        config: &BufferConfig,
    ) -> PointvizResult<Self> {
        if fields == 0 {
            engine_bail!("pointviz::Buffer",
                PointvizError::UnsupportedInputType("placeholder needs at least one field per record".to_string()));
        }

        let mut buffer = Self::with_handle(device, config, fields)?;
        if records > 0 {
            if let Err(err) = buffer.allocate_zeroed(device, records, fields) {
                return Err(buffer.discard(device, err));
            }
        }
        Ok(buffer)
    }

    /// Placeholder with the default config for `element_type`
    pub fn with_shape(
        device: &mut dyn GraphicsDevice,
        records: usize,
        fields: usize,
        element_type: ElementType,
    ) -> PointvizResult<Self> {
        Self::placeholder(device, records, fields, &BufferConfig::new(element_type))
    }

    fn allocate_zeroed(
        &mut self,
        device: &mut dyn GraphicsDevice,
        records: usize,
        fields: usize,
    ) -> PointvizResult<()> {
        let handle = self.handle;
        let desc = self.desc_for(records, fields)?;
        with_bound(device, handle, |device| device.allocate_storage(handle, &desc, None))?;
        engine_debug!("pointviz::Buffer",
            "Allocated placeholder storage for {:?}: {} records × {} fields ({} bytes)",
            handle, records, fields, desc.size);
        self.capacity = records;
        self.record_count = records;
        Ok(())
    }

    /// Hand the handle of a buffer that never reached the caller back to the device
    fn discard(self, device: &mut dyn GraphicsDevice, err: PointvizError) -> PointvizError {
        device.release_handle(self.handle);
        engine_debug!("pointviz::Buffer", "Released handle {:?} after failed construction", self.handle);
        err
    }

    fn with_handle(device: &mut dyn GraphicsDevice, config: &BufferConfig, fields: usize) -> PointvizResult<Self> {
        let handle = device.allocate_handle()?;
        engine_debug!("pointviz::Buffer", "Allocated handle {:?} ({})", handle, config.element_type.name());
        Ok(Self {
            handle,
            element_type: config.element_type,
            usage: config.usage,
            growth: config.growth,
            record_count: 0,
            field_count: fields,
            capacity: 0,
        })
    }

    // ===== OPERATIONS =====

    /// Normalize `data` to this buffer's element type and canonical shape
    pub fn process(&self, data: HostData<'_>) -> PointvizResult<HostArray> {
        normalize(data, self.element_type)
    }

    /// Replace the buffer contents with `data`
    ///
    /// Reallocates when the payload has more records than the current
    /// capacity, otherwise uploads in place. Empty payloads only reset the
    /// record count.
    ///
    /// # Errors
    ///
    /// Normalization errors, ShapeMismatch if the payload's field count
    /// differs from the locked one, and backend failures.
    pub fn update<'a>(&mut self, device: &mut dyn GraphicsDevice, data: impl Into<HostData<'a>>) -> PointvizResult<()> {
        let array = self.process(data.into())?;
        self.write(device, &array)
    }

    /// Map scalars through the JET colormap and upload the colors
    ///
    /// `data` must have one field per record. The buffer ends up with three
    /// fields per record: channels in [0, 1] for float element types,
    /// [0, 127] for Int8 and [0, 255] for the other integer types.
    pub fn update_jet<'a>(
        &mut self,
        device: &mut dyn GraphicsDevice,
        data: impl Into<HostData<'a>>,
    ) -> PointvizResult<()> {
        let scalars = normalize(data.into(), ElementType::Float64)?;
        if !scalars.is_empty() && scalars.field_count() != 1 {
            engine_bail!("pointviz::Buffer",
                PointvizError::ShapeMismatch { expected: 1, found: scalars.field_count() });
        }

        let scale = jet_channel_max(self.element_type);
        let colors: Vec<[f32; 3]> = colormap::jet(&scalars.to_f64_vec())
            .into_iter()
            .map(|color| {
                let color = color * scale;
                if self.element_type.is_float() { color.to_array() } else { color.round().to_array() }
            })
            .collect();

        let array = HostArray::from_records(colors).into_element_type(self.element_type)?;
        self.write(device, &array)
    }

    /// Mark the buffer as holding zero records (storage is kept)
    pub fn clear(&mut self) {
        self.record_count = 0;
    }

    fn write(&mut self, device: &mut dyn GraphicsDevice, array: &HostArray) -> PointvizResult<()> {
        if array.is_empty() {
            self.record_count = 0;
            return Ok(());
        }

        let records = array.record_count();
        let fields = array.field_count();
        let replaces_provisional = fields != self.field_count;
        if replaces_provisional && self.capacity > 0 {
            engine_bail!("pointviz::Buffer",
                PointvizError::ShapeMismatch { expected: self.field_count, found: fields });
        }

        let bytes = array.as_bytes();
        if records > self.capacity {
            self.grow(device, records, fields, bytes)?;
        } else {
            let allocated = self.capacity_bytes();
            if bytes.len() as u64 > allocated {
                engine_bail!("pointviz::Buffer",
                    PointvizError::BackendError(format!(
                        "upload of {} bytes exceeds allocation of {} bytes", bytes.len(), allocated)));
            }
            with_bound(device, self.handle, |device| device.upload_sub_range(self.handle, 0, bytes))?;
            engine_trace!("pointviz::Buffer",
                "Uploaded {} records ({} bytes) in place to {:?}", records, bytes.len(), self.handle);
        }

        if replaces_provisional {
            engine_warn!("pointviz::Buffer",
                "Buffer {:?}: provisional field count {} replaced by {}",
                self.handle, self.field_count, fields);
        }
        self.record_count = records;
        self.field_count = fields;
        Ok(())
    }

    fn grow(
        &mut self,
        device: &mut dyn GraphicsDevice,
        records: usize,
        fields: usize,
        bytes: &[u8],
    ) -> PointvizResult<()> {
        let handle = self.handle;
        let capacity = match self.growth {
            GrowthPolicy::Exact => records,
            GrowthPolicy::Doubling => records.max(self.capacity.saturating_mul(2)),
        };
        let desc = self.desc_for(capacity, fields)?;

        with_bound(device, handle, |device| match self.growth {
            GrowthPolicy::Exact => device.allocate_storage(handle, &desc, Some(bytes)),
            GrowthPolicy::Doubling => {
                device.allocate_storage(handle, &desc, None)?;
                device.upload_sub_range(handle, 0, bytes)
            }
        })?;

        engine_debug!("pointviz::Buffer",
            "Reallocated {:?}: capacity {} -> {} records ({} bytes)",
            handle, self.capacity, capacity, desc.size);
        self.capacity = capacity;
        Ok(())
    }

    fn desc_for(&self, records: usize, fields: usize) -> PointvizResult<BufferDesc> {
        let Some(size) = byte_size(records, fields, self.element_type) else {
            engine_bail!("pointviz::Buffer",
                PointvizError::BackendAllocationFailure(format!(
                    "{} records × {} fields of {} overflow the addressable size",
                    records, fields, self.element_type.name())));
        };
        Ok(BufferDesc {
            size,
            usage: self.usage,
            element_type: self.element_type,
        })
    }

    // ===== ACCESSORS =====

    /// Stable backend handle (bind it for draw calls)
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    /// Number of logically valid records
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Scalars per record
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Number of records backend storage is allocated for
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if the buffer currently holds no records
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Byte size of the valid records: `record_count × field_count × sizeof(element_type)`
    pub fn size(&self) -> u64 {
        byte_size(self.record_count, self.field_count, self.element_type).unwrap_or(u64::MAX)
    }

    /// Byte size of the backend allocation
    pub fn capacity_bytes(&self) -> u64 {
        byte_size(self.capacity, self.field_count, self.element_type).unwrap_or(u64::MAX)
    }

    /// Vertex attribute format matching one record, if the device has one
    pub fn vertex_format(&self) -> Option<BufferFormat> {
        self.element_type.vertex_format(self.field_count)
    }

    /// Give up the buffer, returning its handle for external teardown
    pub fn into_handle(self) -> BufferHandle {
        self.handle
    }
}

/// `records × fields` scalars of `element_type` in bytes, None on overflow
fn byte_size(records: usize, fields: usize, element_type: ElementType) -> Option<u64> {
    let bytes = records.checked_mul(fields)?.checked_mul(element_type.size_bytes())?;
    u64::try_from(bytes).ok()
}

/// Largest colormap channel value `element_type` holds
fn jet_channel_max(element_type: ElementType) -> f32 {
    match element_type {
        ElementType::Float32 | ElementType::Float64 => 1.0,
        ElementType::Int8 => i8::MAX as f32,
        _ => u8::MAX as f32,
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
