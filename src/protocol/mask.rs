//! Payload masking (RFC 6455 Section 5.3).
//!
//! Masking is an XOR with a repeating 4-byte key, so the same routine masks and
//! unmasks. Payloads arrive in pieces, so every entry point that works on a
//! piece takes the offset of that piece within the frame payload.

/// Byte-at-a-time XOR masking. Reference implementation.
#[inline]
pub fn apply_mask(data: &mut [u8], mask: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

/// Word-at-a-time XOR masking, 8 bytes per step.
#[inline]
pub fn apply_mask_fast(data: &mut [u8], mask: [u8; 4]) {
    let key = u64::from_ne_bytes([
        mask[0], mask[1], mask[2], mask[3], mask[0], mask[1], mask[2], mask[3],
    ]);

    let mut words = data.chunks_exact_mut(8);
    for chunk in &mut words {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        chunk.copy_from_slice(&(u64::from_ne_bytes(word) ^ key).to_ne_bytes());
    }

    // Eight is a multiple of four, so the tail starts on key index 0.
    for (i, byte) in words.into_remainder().iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

/// Unmask a piece of payload that starts `offset` bytes into the frame payload.
///
/// Byte `i` of `data` is XORed with `mask[(offset + i) % 4]`.
#[inline]
pub fn apply_mask_at(data: &mut [u8], mask: [u8; 4], offset: usize) {
    let mut rotated = mask;
    rotated.rotate_left(offset % 4);
    apply_mask_fast(data, rotated);
}
