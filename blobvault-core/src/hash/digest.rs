use md5::{Digest as _, Md5};

use crate::error::{Result, VaultError};

/// Length of a rendered chunk digest (128-bit MD5, hex).
pub const DIGEST_HEX_LEN: usize = 32;

/// Content digest of one chunk, rendered as 32 uppercase hex characters.
pub fn blob_digest(data: &[u8]) -> String {
    hex::encode_upper(Md5::digest(data))
}

pub fn parse_digest(hex_str: &str) -> Result<[u8; 16]> {
    let mut out = [0u8; 16];
    let bytes = hex::decode(hex_str.trim())
        .map_err(|e| VaultError::InvalidDigest(format!("{hex_str}: {e}")))?;
    if bytes.len() != out.len() {
        return Err(VaultError::InvalidDigest(format!(
            "expected {} hex chars, got {}",
            DIGEST_HEX_LEN,
            hex_str.trim().len()
        )));
    }
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Canonical uppercase form of a user-supplied digest.
pub fn normalize_digest(hex_str: &str) -> Result<String> {
    Ok(hex::encode_upper(parse_digest(hex_str)?))
}

/// Sharded object key: `H[0:2]/H[2:4]/H[4:6]/H[6:8]/H`.
pub fn object_key(digest: &str) -> Result<String> {
    if digest.len() != DIGEST_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(VaultError::InvalidDigest(digest.to_string()));
    }
    Ok(format!(
        "{}/{}/{}/{}/{}",
        &digest[0..2],
        &digest[2..4],
        &digest[4..6],
        &digest[6..8],
        digest
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_uppercase_md5() {
        // md5("") and md5("abc")
        assert_eq!(blob_digest(b""), "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(blob_digest(b"abc"), "900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn object_key_shards_four_levels() {
        let key = object_key("900150983CD24FB0D6963F7D28E17F72").unwrap();
        assert_eq!(key, "90/01/50/98/900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn object_key_rejects_bad_digest() {
        assert!(object_key("90015098").is_err());
        assert!(object_key("../0150983CD24FB0D6963F7D28E17F72").is_err());
    }

    #[test]
    fn normalize_uppercases() {
        let d = normalize_digest("900150983cd24fb0d6963f7d28e17f72").unwrap();
        assert_eq!(d, "900150983CD24FB0D6963F7D28E17F72");
        assert!(normalize_digest("zz").is_err());
    }
}
