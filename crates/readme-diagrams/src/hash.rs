//! Content hashing for stable output names.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a folded over UTF-16 code units.
///
/// Folding UTF-16 units (rather than UTF-8 bytes) matches JavaScript FNV helpers built on
/// `charCodeAt`, so names for non-ASCII diagrams agree with fallbacks produced by those tools.
pub fn fnv1a_32(text: &str) -> u32 {
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Lowercase, unpadded hex fingerprint of the trimmed diagram body.
pub fn content_hash(body: &str) -> String {
    format!("{:x}", fnv1a_32(body.trim()))
}
