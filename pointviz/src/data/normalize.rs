/// Normalization of host input into the canonical buffer layout.
///
/// Output is always a dense array of the requested element type with rank
/// >= 2, whose first dimension is the record count. Rank-1 input becomes a
/// single-field column. Canonical input comes back unchanged.

use crate::data::host_data::{HostArray, HostData, TensorDevice, TensorLike};
use crate::error::{PointvizError, PointvizResult};
use crate::graphics_device::ElementType;
use crate::{engine_bail, engine_trace};

/// Normalize any accepted input to `element_type` with shape `(records, fields, ..)`
pub fn normalize(data: HostData<'_>, element_type: ElementType) -> PointvizResult<HostArray> {
    let array = match data {
        HostData::Sequence(seq) => seq.to_array()?,
        HostData::Array(array) => array,
        HostData::Tensor(tensor) => detach_to_host(tensor)?,
    };

    let array = match array.rank() {
        0 => engine_bail!("pointviz::normalize",
            PointvizError::UnsupportedInputType("rank-0 value has no record dimension".to_string())),
        1 => {
            let records = array.len();
            array.reshape(vec![records, 1])?
        }
        _ => array,
    };

    array.into_element_type(element_type)
}

/// Materialize a tensor-like object as an owned host array
fn detach_to_host(tensor: &dyn TensorLike) -> PointvizResult<HostArray> {
    let expected = tensor.shape();
    if tensor.requires_grad() || tensor.device() != TensorDevice::Cpu {
        engine_trace!("pointviz::normalize",
            "Detaching tensor {:?} from {:?} (requires_grad: {})",
            expected, tensor.device(), tensor.requires_grad());
    }

    let host = tensor.to_host()?;
    if host.shape() != expected.as_slice() {
        engine_bail!("pointviz::normalize",
            PointvizError::UnsupportedInputType(format!(
                "tensor reports shape {:?} but materialized as {:?}",
                expected, host.shape())));
    }
    Ok(host)
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
