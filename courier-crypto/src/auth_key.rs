//! The 2048-bit authorization key agreed during the DH handshake.

use crate::sha1;

/// A 256-byte authorization key with its derived identifiers cached.
///
/// `key_id` is the low 64 bits of `SHA1(key)` and travels in front of every
/// encrypted message; `aux_hash` is the high 64 bits and only matters while
/// the handshake is being confirmed or retried.
#[derive(Clone)]
pub struct AuthKey {
    pub(crate) data:     [u8; 256],
    pub(crate) aux_hash: [u8; 8],
    pub(crate) key_id:   [u8; 8],
}

impl AuthKey {
    pub fn from_bytes(data: [u8; 256]) -> Self {
        let sha = sha1!(&data);
        Self {
            data,
            aux_hash: std::array::from_fn(|i| sha[i]),
            key_id:   std::array::from_fn(|i| sha[12 + i]),
        }
    }

    /// Restore from persisted bytes; `None` unless exactly 256 bytes long.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let data: [u8; 256] = data.try_into().ok()?;
        Some(Self::from_bytes(data))
    }

    pub fn to_bytes(&self) -> [u8; 256] {
        self.data
    }

    pub fn key_id(&self) -> [u8; 8] {
        self.key_id
    }

    /// `retry_id` for a repeated `set_client_DH_params`.
    pub fn aux_hash(&self) -> i64 {
        i64::from_le_bytes(self.aux_hash)
    }

    /// `new_nonce_hash{number}` as carried by `dh_gen_ok` (1), `dh_gen_retry`
    /// (2) and `dh_gen_fail` (3).
    pub fn calc_new_nonce_hash(&self, new_nonce: &[u8; 32], number: u8) -> [u8; 16] {
        let sha = sha1!(new_nonce, [number], &self.aux_hash);
        std::array::from_fn(|i| sha[4 + i])
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        write!(f, "AuthKey(id={:#018x})", u64::from_le_bytes(self.key_id))
    }
}

impl PartialEq for AuthKey {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for AuthKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_come_from_sha1() {
        let key = AuthKey::from_bytes([0x42; 256]);
        let sha = sha1!(&[0x42u8; 256]);
        assert_eq!(key.key_id(), sha[12..20]);
        assert_eq!(key.aux_hash().to_le_bytes(), sha[..8]);
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(AuthKey::from_slice(&[0u8; 255]).is_none());
        assert!(AuthKey::from_slice(&[0u8; 256]).is_some());
    }

    #[test]
    fn nonce_hash_depends_on_number() {
        let key = AuthKey::from_bytes([1; 256]);
        let nonce = [9u8; 32];
        assert_ne!(key.calc_new_nonce_hash(&nonce, 1), key.calc_new_nonce_hash(&nonce, 2));
    }

    #[test]
    fn debug_hides_key() {
        let text = format!("{:?}", AuthKey::from_bytes([0xab; 256]));
        assert!(!text.contains("171, 171"));
        assert!(text.starts_with("AuthKey(id=0x"));
    }
}
