use super::*;

#[test]
fn test_lock_unlock_writes_into_buffer() {
    let mut device = MockAudioDevice::new(16);
    let (mut region0, region1) = device.lock(0, 8).unwrap();
    assert!(region1.is_none());
    assert_eq!(region0.data.len(), 8);

    region0.data.fill(0xAB);
    device.unlock(region0, None).unwrap();

    assert_eq!(&device.buffer()[0..8], &[0xABu8; 8]);
    assert_eq!(device.cursors().unwrap().1, 8);
}

#[test]
fn test_lock_wraps_into_two_regions() {
    let mut device = MockAudioDevice::new(16);
    let (mut region0, region1) = device.lock(12, 8).unwrap();
    assert_eq!(region0.data.len(), 4);
    let mut region1 = region1.expect("lock crossing the buffer end must wrap");
    assert_eq!(region1.data.len(), 4);

    region0.data.fill(1);
    region1.data.fill(2);
    device.unlock(region0, Some(region1)).unwrap();

    assert_eq!(&device.buffer()[12..16], &[1u8; 4]);
    assert_eq!(&device.buffer()[0..4], &[2u8; 4]);
}

#[test]
fn test_play_cursor_advances_independently() {
    let mut device = MockAudioDevice::new(16);
    device.advance_play_cursor(5);
    assert_eq!(device.cursors().unwrap().0, 5);
}
