//! Random short-code generation.
//!
//! Codes are drawn from the OS CSPRNG via `getrandom`. Character selection
//! uses rejection sampling over random bytes, so every symbol of the
//! charset is equally likely even though neither 52 nor 62 divides 256.

use crate::error::AppError;

/// Longest code (prefix included) the namespace accepts.
pub const MAX_CODE_LENGTH: usize = 32;

/// Letter-only charset used for the first generated character.
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Full alphanumeric charset for the remaining characters.
const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const ENTROPY_BLOCK: usize = 64;

/// Generates `prefix` followed by `length` random characters.
///
/// The first generated character is always a letter; the rest are
/// alphanumeric.
///
/// # Errors
///
/// - [`AppError::InvalidLength`] if `length` is outside `1..=32`
/// - [`AppError::Entropy`] if the system random source fails
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6, "promo")?;
/// assert_eq!(code.len(), 11);
/// assert!(code.starts_with("promo"));
/// ```
pub fn generate_code(length: usize, prefix: &str) -> Result<String, AppError> {
    if length == 0 || length > MAX_CODE_LENGTH {
        return Err(AppError::InvalidLength(length as i64));
    }

    let mut sampler = ByteSampler::new();
    let mut code = String::with_capacity(prefix.len() + length);
    code.push_str(prefix);

    code.push(sampler.pick(LETTERS)? as char);
    for _ in 1..length {
        code.push(sampler.pick(ALPHANUMERIC)? as char);
    }

    Ok(code)
}

/// Buffered reader over OS entropy with unbiased index selection.
struct ByteSampler {
    buf: [u8; ENTROPY_BLOCK],
    pos: usize,
}

impl ByteSampler {
    fn new() -> Self {
        Self {
            buf: [0u8; ENTROPY_BLOCK],
            pos: ENTROPY_BLOCK,
        }
    }

    fn next_byte(&mut self) -> Result<u8, AppError> {
        if self.pos == ENTROPY_BLOCK {
            getrandom::fill(&mut self.buf).map_err(|e| AppError::Entropy(e.to_string()))?;
            self.pos = 0;
        }

        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Picks one symbol of `charset`, discarding bytes in the biased tail.
    fn pick(&mut self, charset: &[u8]) -> Result<u8, AppError> {
        let n = charset.len();
        let limit = rejection_limit(n);

        loop {
            let byte = self.next_byte()? as usize;
            if byte < limit {
                return Ok(charset[byte % n]);
            }
        }
    }
}

/// Largest multiple of `n` not exceeding 256.
fn rejection_limit(n: usize) -> usize {
    256 - (256 % n)
}
