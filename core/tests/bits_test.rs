use ledtoy_core::bits::{bit_is_set, bit_set_to};

#[test]
fn test_set_then_get_roundtrip() {
    for offset in 0..16 {
        let mut word = 0u16;
        bit_set_to(&mut word, offset, true);
        assert!(bit_is_set(word, offset));
        bit_set_to(&mut word, offset, false);
        assert!(!bit_is_set(word, offset));
    }
}

#[test]
fn test_set_leaves_other_bits_alone() {
    let mut word = 0b1010_0101_0000_1111u16;
    bit_set_to(&mut word, 9, true);
    assert_eq!(word, 0b1010_0111_0000_1111);
    bit_set_to(&mut word, 15, false);
    assert_eq!(word, 0b0010_0111_0000_1111);
}

#[test]
fn test_out_of_range_offset_is_masked() {
    let mut word = 0xffffu16;
    bit_set_to(&mut word, 16, false);
    bit_set_to(&mut word, 200, false);
    assert_eq!(word, 0xffff);
    assert!(!bit_is_set(word, 16));
    assert!(!bit_is_set(word, 255));
}
