//! RSA-PAD, the padding scheme wrapping `p_q_inner_data` during key exchange.

use num_bigint::BigUint;
use crate::{aes, sha256};

/// Public key of a DC: modulus `n`, exponent `e`.
pub struct Key {
    n: BigUint,
    e: BigUint,
}

impl Key {
    /// From decimal strings; `None` if either is not a decimal number.
    pub fn new(n: &str, e: &str) -> Option<Self> {
        Some(Self {
            n: BigUint::parse_bytes(n.as_bytes(), 10)?,
            e: BigUint::parse_bytes(e.as_bytes(), 10)?,
        })
    }
}

/// Big-endian `+1`, wrapping to zero.
fn increment(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            return;
        }
    }
}

/// Largest payload RSA-PAD accepts.
pub const MAX_PAYLOAD: usize = 144;

const PADDED_LEN: usize = 192;

/// RSA-PAD: pad `data` to 192 bytes, hide it under a temporary AES key,
/// then RSA-encrypt the 256-byte result.
///
/// `random_bytes` is the padding (first 192 bytes) and the temporary key
/// (last 32). `None` when `data` is longer than [`MAX_PAYLOAD`].
pub fn encrypt_hashed(data: &[u8], key: &Key, random_bytes: &[u8; 224]) -> Option<Vec<u8>> {
    let fill = PADDED_LEN.checked_sub(data.len()).filter(|_| data.len() <= MAX_PAYLOAD)?;
    let padded = [data, &random_bytes[..fill]].concat();
    let mut temp_key: [u8; 32] = random_bytes[PADDED_LEN..].try_into().ok()?;

    let plain = loop {
        let mut hidden: Vec<u8> = padded.iter().rev().copied().collect();
        hidden.extend_from_slice(&sha256!(&temp_key, &padded));
        aes::ige_encrypt(&mut hidden, &temp_key, &[0; 32]);

        let mask = sha256!(&hidden);
        let mut block: Vec<u8> = temp_key.iter().zip(mask).map(|(k, m)| k ^ m).collect();
        block.append(&mut hidden);

        // Retry with the next key until the block is below the modulus.
        let value = BigUint::from_bytes_be(&block);
        if value < key.n {
            break value;
        }
        increment(&mut temp_key);
    };

    let cipher = plain.modpow(&key.e, &key.n).to_bytes_be();
    let mut out = vec![0u8; 256usize.saturating_sub(cipher.len())];
    out.extend(cipher);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_carries() {
        let mut v = [0x00, 0xff, 0xff];
        increment(&mut v);
        assert_eq!(v, [0x01, 0x00, 0x00]);

        let mut v = [0xff, 0xff];
        increment(&mut v);
        assert_eq!(v, [0x00, 0x00]);
    }

    #[test]
    fn rejects_oversized_payload() {
        let key = Key::new("3233", "17").unwrap();
        assert!(encrypt_hashed(&[0u8; MAX_PAYLOAD + 1], &key, &[0u8; 224]).is_none());
    }

    #[test]
    fn bad_decimal_is_rejected() {
        assert!(Key::new("12a", "3").is_none());
    }
}
