//! AES-256 in the two modes MTProto uses.
//!
//! * IGE for message payloads and the handshake.
//! * CTR for CDN file parts, whose counter is derived from the file offset.

use ::aes::Aes256;
use ::aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, KeyIvInit, StreamCipher, generic_array::GenericArray};

type Ctr256 = ctr::Ctr128BE<Aes256>;

/// Encrypt `buffer` in place with AES-256-IGE. `buffer.len()` must be a
/// multiple of 16; a trailing partial block is left untouched.
pub fn ige_encrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    debug_assert_eq!(buffer.len() % 16, 0);
    let cipher = Aes256::new(GenericArray::from_slice(key));

    let mut prev_cipher = [0u8; 16];
    let mut prev_plain = [0u8; 16];
    prev_cipher.copy_from_slice(&iv[..16]);
    prev_plain.copy_from_slice(&iv[16..]);

    for chunk in buffer.chunks_exact_mut(16) {
        let mut plain = [0u8; 16];
        plain.copy_from_slice(chunk);

        let mut block = GenericArray::clone_from_slice(chunk);
        xor_in_place(&mut block, &prev_cipher);
        cipher.encrypt_block(&mut block);
        xor_in_place(&mut block, &prev_plain);

        chunk.copy_from_slice(&block);
        prev_cipher.copy_from_slice(&block);
        prev_plain = plain;
    }
}

/// Decrypt `buffer` in place with AES-256-IGE.
pub fn ige_decrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    debug_assert_eq!(buffer.len() % 16, 0);
    let cipher = Aes256::new(GenericArray::from_slice(key));

    let mut prev_cipher = [0u8; 16];
    let mut prev_plain = [0u8; 16];
    prev_cipher.copy_from_slice(&iv[..16]);
    prev_plain.copy_from_slice(&iv[16..]);

    for chunk in buffer.chunks_exact_mut(16) {
        let mut encrypted = [0u8; 16];
        encrypted.copy_from_slice(chunk);

        let mut block = GenericArray::clone_from_slice(chunk);
        xor_in_place(&mut block, &prev_plain);
        cipher.decrypt_block(&mut block);
        xor_in_place(&mut block, &prev_cipher);

        chunk.copy_from_slice(&block);
        prev_plain.copy_from_slice(&block);
        prev_cipher = encrypted;
    }
}

fn xor_in_place(block: &mut [u8], other: &[u8; 16]) {
    for (a, b) in block.iter_mut().zip(other) {
        *a ^= b;
    }
}

/// Apply the AES-256-CTR keystream to `buffer` (encryption and decryption
/// are the same operation).
pub fn ctr256_decrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 16]) {
    let mut cipher = Ctr256::new(GenericArray::from_slice(key), GenericArray::from_slice(iv));
    cipher.apply_keystream(buffer);
}

/// CTR initial counter for a CDN part starting at `offset`: the first 12
/// bytes of the file IV followed by `offset / 16` as a big-endian `u32`.
pub fn cdn_iv(base_iv: &[u8; 16], offset: i64) -> [u8; 16] {
    let mut iv = *base_iv;
    iv[12..].copy_from_slice(&((offset / 16) as u32).to_be_bytes());
    iv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ige_inverts() {
        let key = [7u8; 32];
        let iv = core::array::from_fn(|i| i as u8);
        let plain: Vec<u8> = (0..64).collect();

        let mut buf = plain.clone();
        ige_encrypt(&mut buf, &key, &iv);
        assert_ne!(buf, plain);
        ige_decrypt(&mut buf, &key, &iv);
        assert_eq!(buf, plain);
    }

    #[test]
    fn ige_chains_blocks() {
        // Identical plaintext blocks must not produce identical ciphertext blocks.
        let mut buf = [0u8; 32];
        ige_encrypt(&mut buf, &[1u8; 32], &[2u8; 32]);
        assert_ne!(buf[..16], buf[16..]);
    }

    #[test]
    fn ctr_offset_matches_stream_position() {
        let key = [9u8; 32];
        let base = [3u8; 16];
        let plain = vec![0x55u8; 64];

        let mut whole = plain.clone();
        ctr256_decrypt(&mut whole, &key, &cdn_iv(&base, 0));

        let mut tail = plain[32..].to_vec();
        ctr256_decrypt(&mut tail, &key, &cdn_iv(&base, 32));
        assert_eq!(tail, whole[32..]);
    }

    #[test]
    fn cdn_iv_replaces_last_word() {
        let iv = cdn_iv(&[0xff; 16], 16 * 0x0102);
        assert_eq!(&iv[..12], &[0xff; 12]);
        assert_eq!(&iv[12..], &[0, 0, 1, 2]);
    }
}
