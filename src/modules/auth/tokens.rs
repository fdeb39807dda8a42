use rand::RngCore;
use rand::rngs::OsRng;

/// Number of random bytes behind each reset token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Source of opaque reset token strings.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Hex-encoded bytes from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
