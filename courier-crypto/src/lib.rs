//! MTProto 2.0 cryptography.
//!
//! The per-message cipher lives here ([`encrypt_data_v2`],
//! [`decrypt_data_v2`] and their `_as` forms for either [`Side`]); the
//! building blocks used by the key exchange and CDN downloads are in
//! [`aes`], [`rsa`], [`factorize`] and the `sha1!`/`sha256!` macros.

#![deny(unsafe_code)]

pub mod aes;
mod auth_key;
mod deque_buffer;
mod factorize;
pub mod rsa;
mod sha;

pub use auth_key::AuthKey;
pub use deque_buffer::DequeBuffer;
pub use factorize::factorize;

#[doc(hidden)]
pub mod __private {
    pub use sha1;
    pub use sha2;
}

// ─── MTProto 2.0 encrypt / decrypt ───────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DecryptError {
    /// Shorter than the 24-byte header, or a body that is not whole AES blocks.
    #[error("ciphertext has an invalid length")]
    InvalidBuffer,
    #[error("message is for another auth key")]
    AuthKeyMismatch,
    /// Integrity failure: the plaintext does not hash to the carried `msg_key`.
    #[error("msg_key does not match the plaintext")]
    MessageKeyMismatch,
}

/// Which end of the connection produced a message. Selects the `x` offset
/// into the auth key used for key derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Client,
    Server,
}

impl Side {
    fn x(self) -> usize {
        match self {
            Side::Client => 0,
            Side::Server => 8,
        }
    }

    fn peer(self) -> Self {
        match self {
            Side::Client => Side::Server,
            Side::Server => Side::Client,
        }
    }
}

/// `parts` laid end to end; their lengths must add up to `N`.
fn join<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut at = 0;
    for part in parts {
        out[at..at + part.len()].copy_from_slice(part);
        at += part.len();
    }
    debug_assert_eq!(at, N);
    out
}

/// AES key and IV for a message written by `sender`.
fn derive_aes(auth_key: &AuthKey, msg_key: &[u8; 16], sender: Side) -> ([u8; 32], [u8; 32]) {
    let x = sender.x();
    let a = sha256!(msg_key, &auth_key.data[x..x + 36]);
    let b = sha256!(&auth_key.data[x + 40..x + 76], msg_key);
    (join(&[&a[..8], &b[8..24], &a[24..]]), join(&[&b[..8], &a[8..24], &b[24..]]))
}

/// Middle 128 bits of `SHA256(auth_key[88+x..120+x] ‖ plaintext)`.
fn msg_key_for(auth_key: &AuthKey, plaintext: &[u8], sender: Side) -> [u8; 16] {
    let x = sender.x();
    join(&[&sha256!(&auth_key.data[x + 88..x + 120], plaintext)[8..24]])
}

/// Between 17 and 32 bytes, leaving the total a multiple of 16.
fn padding_len(len: usize) -> usize {
    16 + (16 - (len % 16))
}

/// Encrypt a client-originated message in place.
///
/// After this call `buffer` contains `key_id ‖ msg_key ‖ ciphertext`.
pub fn encrypt_data_v2(buffer: &mut DequeBuffer, auth_key: &AuthKey) {
    encrypt_data_v2_as(buffer, auth_key, Side::Client)
}

/// Encrypt a message produced by `side`.
pub fn encrypt_data_v2_as(buffer: &mut DequeBuffer, auth_key: &AuthKey, side: Side) {
    let mut rnd = [0u8; 32];
    getrandom::getrandom(&mut rnd).expect("OS random source unavailable");
    do_encrypt_data_v2(buffer, auth_key, &rnd, side);
}

pub(crate) fn do_encrypt_data_v2(buffer: &mut DequeBuffer, auth_key: &AuthKey, rnd: &[u8; 32], side: Side) {
    let pad = padding_len(buffer.len());
    buffer.extend(rnd.iter().take(pad).copied());

    let msg_key = msg_key_for(auth_key, buffer.as_ref(), side);
    let (key, iv) = derive_aes(auth_key, &msg_key, side);
    aes::ige_encrypt(buffer.as_mut(), &key, &iv);

    buffer.extend_front(&msg_key);
    buffer.extend_front(&auth_key.key_id);
}

/// Decrypt a server-originated message in place.
///
/// `buffer` must start with `key_id ‖ msg_key ‖ ciphertext`. On success the
/// returned slice is the plaintext, padding included.
pub fn decrypt_data_v2<'a>(buffer: &'a mut [u8], auth_key: &AuthKey) -> Result<&'a mut [u8], DecryptError> {
    decrypt_data_v2_as(buffer, auth_key, Side::Client)
}

/// Decrypt a message received by `receiver` (i.e. produced by its peer).
pub fn decrypt_data_v2_as<'a>(
    buffer: &'a mut [u8],
    auth_key: &AuthKey,
    receiver: Side,
) -> Result<&'a mut [u8], DecryptError> {
    let (header, body) = match buffer.split_at_mut_checked(24) {
        Some((header, body)) if body.len() % 16 == 0 => (header, body),
        _ => return Err(DecryptError::InvalidBuffer),
    };
    if header[..8] != auth_key.key_id {
        return Err(DecryptError::AuthKeyMismatch);
    }
    let msg_key: [u8; 16] = join(&[&header[8..]]);

    let sender = receiver.peer();
    let (key, iv) = derive_aes(auth_key, &msg_key, sender);
    aes::ige_decrypt(body, &key, &iv);

    if msg_key_for(auth_key, body, sender) != msg_key {
        return Err(DecryptError::MessageKeyMismatch);
    }
    Ok(body)
}

/// AES key and IV protecting `server_DH_params_ok.encrypted_answer`.
pub fn generate_key_data_from_nonce(server_nonce: &[u8; 16], new_nonce: &[u8; 32]) -> ([u8; 32], [u8; 32]) {
    let ns = sha1!(new_nonce, server_nonce);
    let sn = sha1!(server_nonce, new_nonce);
    let nn = sha1!(new_nonce, new_nonce);
    (join(&[&ns, &sn[..12]]), join(&[&sn[12..], &nn, &new_nonce[..4]]))
}
