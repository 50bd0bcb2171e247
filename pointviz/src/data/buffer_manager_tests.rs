/// Tests for BufferManager
///
/// These tests validate buffer registration, duplicate and unknown names,
/// forwarding of updates, removal, and aggregate bookkeeping.

use super::*;
use crate::graphics_device::ElementType;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;

fn xyz(count: usize) -> Vec<[f32; 3]> {
    vec![[1.0, 2.0, 3.0]; count]
}

// ============================================================================
// Tests: BufferManager Creation
// ============================================================================

#[test]
fn test_buffer_manager_new() {
    let bm = BufferManager::new();
    assert_eq!(bm.buffer_count(), 0);
    assert_eq!(bm.total_size(), 0);
}

// ============================================================================
// Tests: Add buffers
// ============================================================================

#[test]
fn test_add_buffer() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();

    let buffer = bm.add_buffer(&mut device, "points", xyz(4), &BufferConfig::default()).unwrap();
    assert_eq!(buffer.record_count(), 4);
    assert_eq!(bm.buffer_count(), 1);
}

#[test]
fn test_add_placeholder() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();

    let buffer = bm.add_placeholder(&mut device, "colors", 0, 3, &BufferConfig::default()).unwrap();
    assert_eq!(buffer.field_count(), 3);
    assert_eq!(buffer.capacity(), 0);
}

#[test]
fn test_add_duplicate_name_fails_without_allocating() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_buffer(&mut device, "points", xyz(2), &BufferConfig::default()).unwrap();
    device.clear_events();

    let result = bm.add_buffer(&mut device, "points", xyz(8), &BufferConfig::default());
    assert!(matches!(result, Err(PointvizError::InvalidResource(_))));

    let result = bm.add_placeholder(&mut device, "points", 0, 3, &BufferConfig::default());
    assert!(matches!(result, Err(PointvizError::InvalidResource(_))));

    assert!(device.events().is_empty());
    assert_eq!(bm.buffer_count(), 1);
    assert_eq!(bm.buffer("points").map(Buffer::record_count), Some(2));
}

#[test]
fn test_add_buffer_with_bad_data_is_not_registered() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();

    let result = bm.add_buffer(&mut device, "bad", vec![f32::NAN], &BufferConfig::new(ElementType::UInt8));
    assert!(matches!(result, Err(PointvizError::DTypeCoercionFailure(_))));
    assert!(bm.buffer("bad").is_none());
}

// ============================================================================
// Tests: Update by name
// ============================================================================

#[test]
fn test_update_buffer_by_name() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_placeholder(&mut device, "points", 0, 3, &BufferConfig::default()).unwrap();

    bm.update_buffer(&mut device, "points", xyz(10)).unwrap();
    assert_eq!(bm.buffer("points").map(Buffer::capacity), Some(10));
}

#[test]
fn test_update_buffer_jet_by_name() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_placeholder(&mut device, "heights", 0, 3, &BufferConfig::default()).unwrap();

    bm.update_buffer_jet(&mut device, "heights", vec![0.1f32, 0.7, 0.4]).unwrap();

    let buffer = bm.buffer("heights").unwrap();
    assert_eq!(buffer.field_count(), 3);
    assert_eq!(buffer.record_count(), 3);
}

#[test]
fn test_unknown_name_fails() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();

    assert!(matches!(bm.update_buffer(&mut device, "nope", xyz(1)), Err(PointvizError::InvalidResource(_))));
    assert!(matches!(bm.update_buffer_jet(&mut device, "nope", vec![1.0f32]), Err(PointvizError::InvalidResource(_))));
    assert!(matches!(bm.clear_buffer("nope"), Err(PointvizError::InvalidResource(_))));
    assert!(device.events().is_empty());
}

#[test]
fn test_clear_buffer_by_name() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_buffer(&mut device, "points", xyz(5), &BufferConfig::default()).unwrap();

    bm.clear_buffer("points").unwrap();

    let buffer = bm.buffer("points").unwrap();
    assert_eq!(buffer.record_count(), 0);
    assert_eq!(buffer.capacity(), 5);
}

// ============================================================================
// Tests: Lookup, removal and aggregates
// ============================================================================

#[test]
fn test_buffer_mut_found() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_buffer(&mut device, "points", xyz(5), &BufferConfig::default()).unwrap();

    bm.buffer_mut("points").unwrap().update(&mut device, xyz(2)).unwrap();
    assert_eq!(bm.buffer("points").map(Buffer::record_count), Some(2));
    assert!(bm.buffer_mut("nonexistent").is_none());
}

#[test]
fn test_remove_buffer_returns_handle_owner() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    let handle = bm.add_buffer(&mut device, "points", xyz(1), &BufferConfig::default()).unwrap().handle();

    let removed = bm.remove_buffer("points").unwrap();
    assert_eq!(removed.into_handle(), handle);
    assert_eq!(bm.buffer_count(), 0);
    assert!(bm.remove_buffer("points").is_none());
}

#[test]
fn test_buffer_names() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_placeholder(&mut device, "points", 0, 3, &BufferConfig::default()).unwrap();
    bm.add_placeholder(&mut device, "colors", 0, 3, &BufferConfig::default()).unwrap();

    let mut names = bm.buffer_names();
    names.sort();
    assert_eq!(names, vec!["colors", "points"]);
}

#[test]
fn test_clear_all_and_total_size() {
    let mut device = MockGraphicsDevice::new();
    let mut bm = BufferManager::new();
    bm.add_buffer(&mut device, "points", xyz(4), &BufferConfig::default()).unwrap();
    bm.add_buffer(&mut device, "ids", vec![1u32, 2, 3], &BufferConfig::new(ElementType::UInt32)).unwrap();
    assert_eq!(bm.total_size(), 48 + 12);

    bm.clear_all();

    assert_eq!(bm.buffer_count(), 2);
    assert_eq!(bm.total_size(), 0);
    assert_eq!(bm.buffer("points").map(Buffer::capacity), Some(4));
}
