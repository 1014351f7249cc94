//! Single-bit access inside a packed row word.
//!
//! Every board in the system stores one display row as a `u16`, bit 15
//! being the leftmost pixel. The same word doubles as the collision
//! mask for that row, so all pixel tests stay O(1) whole-row AND/OR
//! operations and only the edges go through these helpers.
//!
//! Offsets outside the word are a caller bug; the helpers mask them
//! (read as unset, write as no-op) instead of wrapping the shift, so a
//! bad coordinate can never corrupt a neighboring bit.

/// Report whether bit `offset` (0 = rightmost) of `word` is set.
pub fn bit_is_set(word: u16, offset: u8) -> bool {
    if offset >= 16 {
        return false;
    }
    (word >> offset) & 1 != 0
}

/// Set bit `offset` of `word` to `bit`, leaving all other bits alone.
pub fn bit_set_to(word: &mut u16, offset: u8, bit: bool) {
    if offset >= 16 {
        return;
    }
    *word = (*word & !(1 << offset)) | ((bit as u16) << offset);
}
