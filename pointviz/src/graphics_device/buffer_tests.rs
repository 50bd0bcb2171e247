//! Unit tests for graphics_device/buffer.rs
//!
//! Element sizes, vertex format mapping, and format sizes.

use super::*;

const ALL_TYPES: [ElementType; 9] = [
    ElementType::Float32,
    ElementType::Float64,
    ElementType::Int8,
    ElementType::UInt8,
    ElementType::Int16,
    ElementType::UInt16,
    ElementType::Int32,
    ElementType::UInt32,
    ElementType::Int64,
];

// ============================================================================
// ELEMENT TYPE
// ============================================================================

#[test]
fn test_element_type_size_bytes() {
    let expected = [4, 8, 1, 1, 2, 2, 4, 4, 8];
    for (element_type, size) in ALL_TYPES.iter().zip(expected) {
        assert_eq!(element_type.size_bytes(), size, "size of {:?}", element_type);
    }
}

#[test]
fn test_element_type_is_float() {
    assert!(ElementType::Float32.is_float());
    assert!(ElementType::Float64.is_float());
    assert!(!ElementType::Int32.is_float());
    assert!(!ElementType::UInt8.is_float());
}

#[test]
fn test_element_type_names_unique() {
    let mut names: Vec<&str> = ALL_TYPES.iter().map(|t| t.name()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), ALL_TYPES.len());
    assert_eq!(ElementType::UInt16.name(), "uint16");
}

// ============================================================================
// VERTEX FORMAT MAPPING
// ============================================================================

#[test]
fn test_vertex_format_float_records() {
    assert_eq!(ElementType::Float32.vertex_format(1), Some(BufferFormat::R32_SFLOAT));
    assert_eq!(ElementType::Float32.vertex_format(3), Some(BufferFormat::R32G32B32_SFLOAT));
    assert_eq!(ElementType::Float32.vertex_format(4), Some(BufferFormat::R32G32B32A32_SFLOAT));
}

#[test]
fn test_vertex_format_record_size_matches_element_size() {
    for element_type in ALL_TYPES {
        for fields in 1..=4 {
            if let Some(format) = element_type.vertex_format(fields) {
                assert_eq!(
                    format.size_bytes() as usize,
                    element_type.size_bytes() * fields,
                    "{:?} x {}", element_type, fields
                );
            }
        }
    }
}

#[test]
fn test_vertex_format_unsupported() {
    assert_eq!(ElementType::Float64.vertex_format(3), None);
    assert_eq!(ElementType::Int64.vertex_format(1), None);
    assert_eq!(ElementType::UInt8.vertex_format(3), None);
    assert_eq!(ElementType::Float32.vertex_format(0), None);
    assert_eq!(ElementType::Float32.vertex_format(5), None);
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

#[test]
fn test_buffer_usage_default_is_static() {
    assert_eq!(BufferUsage::default(), BufferUsage::Static);
}

#[test]
fn test_buffer_handle_default_is_null() {
    use slotmap::Key;
    assert!(BufferHandle::default().is_null());
}
