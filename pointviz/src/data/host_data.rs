/// Host-side input data accepted by buffers.
///
/// Three closed input variants, each normalized by its own branch:
/// - Sequence: nested numeric sequences (shape inferred, must be rectangular)
/// - Array: dense typed arrays with an explicit shape
/// - Tensor: tensor-like objects that can detach themselves to a host array
///
/// Coercion between element types follows Rust `as` casts, except that
/// non-finite floats cannot be stored in integer types.

use glam::{Vec2, Vec3, Vec4};

use crate::engine_err;
use crate::error::{PointvizError, PointvizResult};
use crate::graphics_device::ElementType;

// ===== ELEMENT TRAIT =====

mod private {
    pub trait Sealed {}
}

/// Scalar types an ArrayData can hold
pub trait Element: bytemuck::Pod + private::Sealed {
    /// Matching canonical element type
    const TYPE: ElementType;

    /// Convert from a float, None if the value cannot be represented
    fn from_f64(value: f64) -> Option<Self>;

    /// Convert from an integer (C-style truncating cast)
    fn from_i64(value: i64) -> Self;

    /// Widen to f64
    fn to_f64(self) -> f64;

    /// Wrap a vector into the matching ArrayData variant
    fn into_data(values: Vec<Self>) -> ArrayData;

    /// Borrow the matching ArrayData variant
    fn slice(data: &ArrayData) -> Option<&[Self]>;
}

macro_rules! impl_element {
    (@impl $ty:ty, $variant:ident, $from_f64:expr) => {
        impl private::Sealed for $ty {}

        impl Element for $ty {
            const TYPE: ElementType = ElementType::$variant;

            fn from_f64(value: f64) -> Option<Self> {
                ($from_f64)(value)
            }

            fn from_i64(value: i64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn into_data(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
    ($ty:ty, $variant:ident, float) => {
        impl_element!(@impl $ty, $variant, |v: f64| Some(v as $ty));
    };
    ($ty:ty, $variant:ident, int) => {
        impl_element!(@impl $ty, $variant, |v: f64| if v.is_finite() { Some(v as $ty) } else { None });
    };
}

impl_element!(f32, Float32, float);
impl_element!(f64, Float64, float);
impl_element!(i8, Int8, int);
impl_element!(u8, UInt8, int);
impl_element!(i16, Int16, int);
impl_element!(u16, UInt16, int);
impl_element!(i32, Int32, int);
impl_element!(u32, UInt32, int);
impl_element!(i64, Int64, int);

// ===== ARRAY DATA =====

/// Typed, contiguous scalar storage (row-major)
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
}

/// Apply `$body` to the inner vector of any ArrayData variant
macro_rules! with_values {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            ArrayData::Float32($values) => $body,
            ArrayData::Float64($values) => $body,
            ArrayData::Int8($values) => $body,
            ArrayData::UInt8($values) => $body,
            ArrayData::Int16($values) => $body,
            ArrayData::UInt16($values) => $body,
            ArrayData::Int32($values) => $body,
            ArrayData::UInt32($values) => $body,
            ArrayData::Int64($values) => $body,
        }
    };
}

impl ArrayData {
    /// Number of scalars
    pub fn len(&self) -> usize {
        with_values!(self, values => values.len())
    }

    /// True if no scalars are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the stored scalars
    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayData::Float32(_) => ElementType::Float32,
            ArrayData::Float64(_) => ElementType::Float64,
            ArrayData::Int8(_) => ElementType::Int8,
            ArrayData::UInt8(_) => ElementType::UInt8,
            ArrayData::Int16(_) => ElementType::Int16,
            ArrayData::UInt16(_) => ElementType::UInt16,
            ArrayData::Int32(_) => ElementType::Int32,
            ArrayData::UInt32(_) => ElementType::UInt32,
            ArrayData::Int64(_) => ElementType::Int64,
        }
    }

    /// Raw bytes in native endianness
    pub fn as_bytes(&self) -> &[u8] {
        with_values!(self, values => bytemuck::cast_slice(values.as_slice()))
    }

    /// Widen every scalar to f64
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_values!(self, values => values.iter().map(|v| Element::to_f64(*v)).collect())
    }

    fn convert<T: Element>(&self) -> PointvizResult<Vec<T>> {
        match self {
            ArrayData::Float32(values) => convert_floats(values.iter().map(|v| *v as f64)),
            ArrayData::Float64(values) => convert_floats(values.iter().copied()),
            ArrayData::Int8(values) => Ok(values.iter().map(|v| T::from_i64(*v as i64)).collect()),
            ArrayData::UInt8(values) => Ok(values.iter().map(|v| T::from_i64(*v as i64)).collect()),
            ArrayData::Int16(values) => Ok(values.iter().map(|v| T::from_i64(*v as i64)).collect()),
            ArrayData::UInt16(values) => Ok(values.iter().map(|v| T::from_i64(*v as i64)).collect()),
            ArrayData::Int32(values) => Ok(values.iter().map(|v| T::from_i64(*v as i64)).collect()),
            ArrayData::UInt32(values) => Ok(values.iter().map(|v| T::from_i64(*v as i64)).collect()),
            ArrayData::Int64(values) => Ok(values.iter().map(|v| T::from_i64(*v)).collect()),
        }
    }

    /// Convert to another element type
    pub fn cast(&self, element_type: ElementType) -> PointvizResult<ArrayData> {
        Ok(match element_type {
            ElementType::Float32 => ArrayData::Float32(self.convert()?),
            ElementType::Float64 => ArrayData::Float64(self.convert()?),
            ElementType::Int8 => ArrayData::Int8(self.convert()?),
            ElementType::UInt8 => ArrayData::UInt8(self.convert()?),
            ElementType::Int16 => ArrayData::Int16(self.convert()?),
            ElementType::UInt16 => ArrayData::UInt16(self.convert()?),
            ElementType::Int32 => ArrayData::Int32(self.convert()?),
            ElementType::UInt32 => ArrayData::UInt32(self.convert()?),
            ElementType::Int64 => ArrayData::Int64(self.convert()?),
        })
    }
}

fn convert_floats<T: Element>(values: impl Iterator<Item = f64>) -> PointvizResult<Vec<T>> {
    values
        .enumerate()
        .map(|(index, value)| {
            T::from_f64(value).ok_or_else(|| engine_err!("pointviz::HostArray",
                PointvizError::DTypeCoercionFailure(format!(
                    "value {} at index {} cannot be stored as {}",
                    value, index, T::TYPE.name()))))
        })
        .collect()
}

// ===== HOST ARRAY =====

/// Product of `dims`, None on overflow
fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |count, &dim| count.checked_mul(dim))
}

/// Dense host array: a shape plus row-major typed storage
///
/// The first dimension counts records; every further dimension belongs to
/// the record, so `field_count` is the product of the trailing dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct HostArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl HostArray {
    /// Create an array, validating that `shape` covers exactly `data.len()` scalars
    pub fn new(shape: Vec<usize>, data: ArrayData) -> PointvizResult<Self> {
        let Some(expected) = element_count(&shape) else {
            return Err(engine_err!("pointviz::HostArray",
                PointvizError::UnsupportedInputType(format!("shape {:?} overflows the element count", shape))));
        };
        if expected != data.len() {
            return Err(engine_err!("pointviz::HostArray",
                PointvizError::UnsupportedInputType(format!(
                    "shape {:?} describes {} elements but {} were given",
                    shape, expected, data.len()))));
        }
        Ok(Self { shape, data })
    }

    /// Create an array from a typed vector
    pub fn from_vec<T: Element>(shape: Vec<usize>, values: Vec<T>) -> PointvizResult<Self> {
        Self::new(shape, T::into_data(values))
    }

    /// Create a rank-1 array
    pub fn from_scalars<T: Element>(values: Vec<T>) -> Self {
        Self {
            shape: vec![values.len()],
            data: T::into_data(values),
        }
    }

    /// Create a `(records, N)` array from fixed-size records
    pub fn from_records<T: Element, const N: usize>(records: Vec<[T; N]>) -> Self {
        let count = records.len();
        let values: Vec<T> = records.into_iter().flatten().collect();
        Self {
            shape: vec![count, N],
            data: T::into_data(values),
        }
    }

    /// Array dimensions
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total number of scalars
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the array holds no scalars
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of the first dimension (0 for rank-0 arrays)
    pub fn record_count(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Scalars per record (product of the trailing dimensions)
    pub fn field_count(&self) -> usize {
        element_count(self.shape.get(1..).unwrap_or_default()).unwrap_or(usize::MAX)
    }

    /// Element type of the storage
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Typed storage
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Borrow the scalars as `T`, None if the element type differs
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Raw bytes of the storage
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Every scalar widened to f64
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.data.to_f64_vec()
    }

    /// Copy converted to `element_type`
    pub fn cast(&self, element_type: ElementType) -> PointvizResult<HostArray> {
        Ok(Self {
            shape: self.shape.clone(),
            data: self.data.cast(element_type)?,
        })
    }

    /// Convert to `element_type`, reusing the storage when it already matches
    pub fn into_element_type(self, element_type: ElementType) -> PointvizResult<HostArray> {
        if self.element_type() == element_type {
            return Ok(self);
        }
        self.cast(element_type)
    }

    /// Same storage with a different shape covering the same scalar count
    pub fn reshape(self, shape: Vec<usize>) -> PointvizResult<HostArray> {
        Self::new(shape, self.data)
    }
}

// ===== NESTED SEQUENCES =====

/// A scalar leaf of a nested sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Non-numeric leaf; rejected at normalization
    Text(String),
}

/// Nested numeric sequence (list of lists of scalars)
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    Scalar(Scalar),
    List(Vec<Sequence>),
}

impl Sequence {
    /// Shape implied by the first element at each depth
    fn leading_shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut node = self;
        while let Sequence::List(items) = node {
            shape.push(items.len());
            match items.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        shape
    }

    fn flatten<'a>(&'a self, depth: usize, shape: &[usize], out: &mut Vec<&'a Scalar>) -> PointvizResult<()> {
        let rectangular = match self {
            Sequence::Scalar(scalar) => {
                out.push(scalar);
                depth == shape.len()
            }
            Sequence::List(items) => {
                if depth < shape.len() && items.len() == shape[depth] {
                    for item in items {
                        item.flatten(depth + 1, shape, out)?;
                    }
                    true
                } else {
                    false
                }
            }
        };
        if !rectangular {
            return Err(engine_err!("pointviz::Sequence",
                PointvizError::UnsupportedInputType(format!(
                    "ragged nested sequence: inconsistent length at depth {} (expected shape {:?})",
                    depth, shape))));
        }
        Ok(())
    }

    /// Convert to a dense array
    ///
    /// Integer and boolean leaves give an Int64 array; any float leaf makes
    /// the whole array Float64.
    pub fn to_array(&self) -> PointvizResult<HostArray> {
        let shape = self.leading_shape();
        let mut leaves = Vec::new();
        self.flatten(0, &shape, &mut leaves)?;

        let mut any_float = false;
        for (index, leaf) in leaves.iter().enumerate() {
            match leaf {
                Scalar::Float(_) => any_float = true,
                Scalar::Int(_) | Scalar::Bool(_) => {}
                Scalar::Text(text) => {
                    return Err(engine_err!("pointviz::Sequence",
                        PointvizError::DTypeCoercionFailure(format!(
                            "non-numeric value {:?} at index {}", text, index))));
                }
            }
        }

        let data = if any_float {
            ArrayData::Float64(leaves.iter().map(|leaf| match leaf {
                Scalar::Float(v) => *v,
                Scalar::Int(v) => *v as f64,
                Scalar::Bool(v) => *v as u8 as f64,
                Scalar::Text(_) => 0.0,
            }).collect())
        } else {
            ArrayData::Int64(leaves.iter().map(|leaf| match leaf {
                Scalar::Int(v) => *v,
                Scalar::Bool(v) => *v as i64,
                Scalar::Float(_) | Scalar::Text(_) => 0,
            }).collect())
        };
        HostArray::new(shape, data)
    }
}

macro_rules! sequence_from_scalar {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for Sequence {
                fn from(value: $ty) -> Self {
                    Sequence::Scalar(Scalar::$variant(value as $cast))
                }
            }
        )*
    };
}

sequence_from_scalar!(
    f32 => Float as f64,
    f64 => Float as f64,
    i8 => Int as i64,
    u8 => Int as i64,
    i16 => Int as i64,
    u16 => Int as i64,
    i32 => Int as i64,
    u32 => Int as i64,
    i64 => Int as i64,
);

impl From<bool> for Sequence {
    fn from(value: bool) -> Self {
        Sequence::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for Sequence {
    fn from(value: &str) -> Self {
        Sequence::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<Scalar> for Sequence {
    fn from(value: Scalar) -> Self {
        Sequence::Scalar(value)
    }
}

impl<T: Into<Sequence>> From<Vec<T>> for Sequence {
    fn from(values: Vec<T>) -> Self {
        Sequence::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Sequence>, const N: usize> From<[T; N]> for Sequence {
    fn from(values: [T; N]) -> Self {
        Sequence::List(values.into_iter().map(Into::into).collect())
    }
}

// ===== TENSOR-LIKE =====

/// Where a tensor's storage lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensorDevice {
    #[default]
    Cpu,
    /// Accelerator with its ordinal
    Gpu(u32),
}

/// An external tensor that can materialize itself on the host
///
/// `to_host` must detach from any computation graph, copy the storage to
/// host memory, and return an owned array sharing nothing with the tensor.
pub trait TensorLike {
    /// Tensor dimensions
    fn shape(&self) -> Vec<usize>;

    /// True if the tensor participates in gradient tracking
    fn requires_grad(&self) -> bool {
        false
    }

    /// Storage location
    fn device(&self) -> TensorDevice {
        TensorDevice::Cpu
    }

    /// Detached host copy of the tensor
    fn to_host(&self) -> PointvizResult<HostArray>;
}

// ===== HOST DATA =====

/// Any input a buffer accepts
pub enum HostData<'a> {
    Sequence(Sequence),
    Array(HostArray),
    Tensor(&'a dyn TensorLike),
}

impl<'a> HostData<'a> {
    /// Wrap a tensor-like object
    pub fn tensor(tensor: &'a dyn TensorLike) -> Self {
        HostData::Tensor(tensor)
    }
}

impl std::fmt::Debug for HostData<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostData::Sequence(seq) => f.debug_tuple("Sequence").field(seq).finish(),
            HostData::Array(array) => f.debug_tuple("Array").field(array).finish(),
            HostData::Tensor(tensor) => f.debug_struct("Tensor")
                .field("shape", &tensor.shape())
                .field("requires_grad", &tensor.requires_grad())
                .field("device", &tensor.device())
                .finish(),
        }
    }
}

impl From<Sequence> for HostData<'_> {
    fn from(seq: Sequence) -> Self {
        HostData::Sequence(seq)
    }
}

impl From<HostArray> for HostData<'_> {
    fn from(array: HostArray) -> Self {
        HostData::Array(array)
    }
}

impl From<&HostArray> for HostData<'_> {
    fn from(array: &HostArray) -> Self {
        HostData::Array(array.clone())
    }
}

impl<'a> From<&'a dyn TensorLike> for HostData<'a> {
    fn from(tensor: &'a dyn TensorLike) -> Self {
        HostData::Tensor(tensor)
    }
}

macro_rules! host_data_from_vec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for HostData<'_> {
                fn from(values: Vec<$ty>) -> Self {
                    HostData::Array(HostArray::from_scalars(values))
                }
            }
        )*
    };
}

host_data_from_vec!(f32, f64, i8, u8, i16, u16, i32, u32, i64);

impl<T: Element, const N: usize> From<Vec<[T; N]>> for HostData<'_> {
    fn from(records: Vec<[T; N]>) -> Self {
        HostData::Array(HostArray::from_records(records))
    }
}

impl From<&[Vec2]> for HostData<'_> {
    fn from(points: &[Vec2]) -> Self {
        HostData::Array(HostArray::from_records(points.iter().map(|p| p.to_array()).collect()))
    }
}

impl From<&[Vec3]> for HostData<'_> {
    fn from(points: &[Vec3]) -> Self {
        HostData::Array(HostArray::from_records(points.iter().map(|p| p.to_array()).collect()))
    }
}

impl From<&[Vec4]> for HostData<'_> {
    fn from(points: &[Vec4]) -> Self {
        HostData::Array(HostArray::from_records(points.iter().map(|p| p.to_array()).collect()))
    }
}

#[cfg(test)]
#[path = "host_data_tests.rs"]
mod tests;
