/// AES-KW operates on 64-bit semiblocks.
pub const SEMIBLOCK_LENGTH: usize = 8;

/// Smallest plaintext key AES-KW accepts (two semiblocks).
pub const MIN_PLAINTEXT_KEY_LENGTH: usize = 16;

/// Smallest wrapped key: the minimal plaintext plus the integrity semiblock.
pub const MIN_WRAPPED_KEY_LENGTH: usize = MIN_PLAINTEXT_KEY_LENGTH + SEMIBLOCK_LENGTH;

/// Accepted master key sizes in bytes (AES-128, AES-192, AES-256).
pub const MASTER_KEY_LENGTHS: &[usize] = &[16, 24, 32];

/// Length of the AES-KW output for a plaintext of `plaintext_len` bytes.
pub const fn wrapped_len(plaintext_len: usize) -> usize {
    plaintext_len + SEMIBLOCK_LENGTH
}
