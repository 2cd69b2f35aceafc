use sha1::{Digest, Sha1};

/// Stable record id: SHA-1 over the parts, NUL-separated.
pub fn fingerprint_id(parts: &[&str]) -> String {
    let mut hasher = Sha1::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
