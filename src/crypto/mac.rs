use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// The size of an HMAC-SHA256 tag in bytes.
pub const MAC_SIZE: usize = 32;

/// Computes HMAC-SHA256 of `data` under `key`.
pub fn sign(key: &[u8], data: &[u8]) -> Result<[u8; MAC_SIZE]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Encryption(format!("HMAC key error: {}", e)))?;
    mac.update(data);

    let mut tag = [0u8; MAC_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Compares two byte strings in constant time.
///
/// Lengths are not secret; a length mismatch returns `false` immediately.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Encodes bytes as unpadded base64url.
pub fn encode_segment(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes an unpadded base64url segment.
pub fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    general_purpose::URL_SAFE_NO_PAD.decode(segment).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_hmac_vector() {
        // RFC 4231 test case 2
        let tag = sign(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn constant_time_eq_handles_lengths() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn segments_are_unpadded_and_url_safe() {
        let encoded = encode_segment(&[0xfb, 0xff]);
        assert_eq!(encoded, "-_8");
        assert_eq!(decode_segment(&encoded).unwrap(), vec![0xfb, 0xff]);
        assert!(decode_segment("not base64!").is_none());
    }
}
