/// Buffer handle, storage descriptor and element formats

use slotmap::new_key_type;

new_key_type! {
    /// Opaque identifier of a GPU buffer allocation
    ///
    /// Issued once by `GraphicsDevice::allocate_handle` and stable for the
    /// lifetime of the owning Buffer, across any number of reallocations.
    pub struct BufferHandle;
}

/// Draw-frequency hint passed along with storage allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    /// Written rarely, drawn many times
    #[default]
    Static,
    /// Rewritten often, drawn many times
    Dynamic,
    /// Rewritten every frame, drawn a few times
    Stream,
}

/// Canonical scalar storage type of a buffer
///
/// Determines both the host-side coercion target and the wire format tag
/// handed to the device on allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float32,
    Float64,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
}

impl ElementType {
    /// Size of one scalar in bytes
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Float32 | ElementType::Int32 | ElementType::UInt32 => 4,
            ElementType::Float64 | ElementType::Int64 => 8,
        }
    }

    /// True for floating point types
    pub fn is_float(&self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }

    /// Short lowercase name ("float32", "uint8", ...)
    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Int8 => "int8",
            ElementType::UInt8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::UInt16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::UInt32 => "uint32",
            ElementType::Int64 => "int64",
        }
    }

    /// Vertex attribute format for records of `fields` scalars of this type
    ///
    /// Returns None when the device has no matching attribute format
    /// (64-bit scalars, 3-component 8/16-bit vectors, more than 4 fields).
    pub fn vertex_format(&self, fields: usize) -> Option<BufferFormat> {
        use BufferFormat::*;
        let format = match (self, fields) {
            (ElementType::Float32, 1) => R32_SFLOAT,
            (ElementType::Float32, 2) => R32G32_SFLOAT,
            (ElementType::Float32, 3) => R32G32B32_SFLOAT,
            (ElementType::Float32, 4) => R32G32B32A32_SFLOAT,

            (ElementType::Int32, 1) => R32_SINT,
            (ElementType::Int32, 2) => R32G32_SINT,
            (ElementType::Int32, 3) => R32G32B32_SINT,
            (ElementType::Int32, 4) => R32G32B32A32_SINT,

            (ElementType::UInt32, 1) => R32_UINT,
            (ElementType::UInt32, 2) => R32G32_UINT,
            (ElementType::UInt32, 3) => R32G32B32_UINT,
            (ElementType::UInt32, 4) => R32G32B32A32_UINT,

            (ElementType::Int16, 1) => R16_SINT,
            (ElementType::Int16, 2) => R16G16_SINT,
            (ElementType::Int16, 4) => R16G16B16A16_SINT,

            (ElementType::UInt16, 1) => R16_UINT,
            (ElementType::UInt16, 2) => R16G16_UINT,
            (ElementType::UInt16, 4) => R16G16B16A16_UINT,

            (ElementType::Int8, 1) => R8_SINT,
            (ElementType::Int8, 2) => R8G8_SINT,
            (ElementType::Int8, 4) => R8G8B8A8_SINT,

            (ElementType::UInt8, 1) => R8_UINT,
            (ElementType::UInt8, 2) => R8G8_UINT,
            (ElementType::UInt8, 4) => R8G8B8A8_UINT,

            _ => return None,
        };
        Some(format)
    }
}

/// Vertex attribute formats a renderer binds buffers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    // Float formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // 32-bit integer formats
    R32_SINT,
    R32G32_SINT,
    R32G32B32_SINT,
    R32G32B32A32_SINT,
    R32_UINT,
    R32G32_UINT,
    R32G32B32_UINT,
    R32G32B32A32_UINT,

    // 16-bit integer formats
    R16_SINT,
    R16G16_SINT,
    R16G16B16A16_SINT,
    R16_UINT,
    R16G16_UINT,
    R16G16B16A16_UINT,

    // 8-bit integer formats
    R8_SINT,
    R8G8_SINT,
    R8G8B8A8_SINT,
    R8_UINT,
    R8G8_UINT,
    R8G8B8A8_UINT,
}

impl BufferFormat {
    /// Size in bytes of one record in this format
    pub fn size_bytes(&self) -> u32 {
        use BufferFormat::*;
        match self {
            R32_SFLOAT | R32_SINT | R32_UINT => 4,
            R32G32_SFLOAT | R32G32_SINT | R32G32_UINT => 8,
            R32G32B32_SFLOAT | R32G32B32_SINT | R32G32B32_UINT => 12,
            R32G32B32A32_SFLOAT | R32G32B32A32_SINT | R32G32B32A32_UINT => 16,

            R16_SINT | R16_UINT => 2,
            R16G16_SINT | R16G16_UINT => 4,
            R16G16B16A16_SINT | R16G16B16A16_UINT => 8,

            R8_SINT | R8_UINT => 1,
            R8G8_SINT | R8G8_UINT => 2,
            R8G8B8A8_SINT | R8G8B8A8_UINT => 4,
        }
    }
}

/// Descriptor for a full storage (re)allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Draw-frequency hint
    pub usage: BufferUsage,
    /// Scalar type stored in the allocation
    pub element_type: ElementType,
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
