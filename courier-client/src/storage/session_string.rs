//! Portable session strings.
//!
//! A session string packs everything needed to resume an authorized session
//! into one line of URL-safe base64 (no padding):
//!
//! ```text
//! dc_id:u8  api_id:u32be  test_mode:u8  auth_key:[u8; 256]  user_id:i64be  is_bot:u8
//! ```

use std::io;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::SessionData;

const PACKED_LEN: usize = 1 + 4 + 1 + 256 + 8 + 1;

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

/// Encode `data` as a session string. Fails if there is no 256-byte auth key
/// or the DC id does not fit in a byte.
pub fn export(data: &SessionData) -> io::Result<String> {
    let key = data.auth_key.as_deref().filter(|k| k.len() == 256).ok_or_else(|| invalid("no auth key to export"))?;
    let dc_id = u8::try_from(data.dc_id).map_err(|_| invalid("dc id out of range"))?;

    let mut packed = Vec::with_capacity(PACKED_LEN);
    packed.push(dc_id);
    packed.extend_from_slice(&(data.api_id as u32).to_be_bytes());
    packed.push(data.test_mode as u8);
    packed.extend_from_slice(key);
    packed.extend_from_slice(&data.user_id.unwrap_or(0).to_be_bytes());
    packed.push(data.is_bot as u8);
    Ok(URL_SAFE_NO_PAD.encode(packed))
}

/// Decode a session string produced by [`export`]. Trailing `=` padding is
/// tolerated.
pub fn import(s: &str) -> io::Result<SessionData> {
    let packed = URL_SAFE_NO_PAD
        .decode(s.trim().trim_end_matches('='))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if packed.len() != PACKED_LEN {
        return Err(invalid("session string has the wrong length"));
    }

    let api_id = u32::from_be_bytes([packed[1], packed[2], packed[3], packed[4]]);
    let mut user_id = [0u8; 8];
    user_id.copy_from_slice(&packed[262..270]);
    let user_id = i64::from_be_bytes(user_id);

    Ok(SessionData {
        dc_id:     packed[0] as i32,
        api_id:    api_id as i32,
        test_mode: packed[5] != 0,
        auth_key:  Some(packed[6..262].to_vec()),
        user_id:   (user_id != 0).then_some(user_id),
        is_bot:    packed[270] != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> SessionData {
        SessionData {
            dc_id:     4,
            api_id:    123_456,
            test_mode: false,
            auth_key:  Some((0..=255).collect()),
            user_id:   Some(777_000),
            is_bot:    true,
        }
    }

    #[test]
    fn exported_string_imports_back() {
        let s = export(&data()).unwrap();
        assert!(!s.contains('=') && !s.contains('+') && !s.contains('/'));
        assert_eq!(import(&s).unwrap(), data());
        assert_eq!(import(&format!("{s}=")).unwrap(), data());
    }

    #[test]
    fn layout_is_big_endian() {
        let s = export(&data()).unwrap();
        let raw = URL_SAFE_NO_PAD.decode(s).unwrap();
        assert_eq!(raw.len(), 271);
        assert_eq!(raw[0], 4);
        assert_eq!(raw[1..5], 123_456u32.to_be_bytes());
        assert_eq!(raw[262..270], 777_000i64.to_be_bytes());
        assert_eq!(raw[270], 1);
    }

    #[test]
    fn missing_key_cannot_be_exported() {
        let mut d = data();
        d.auth_key = None;
        assert!(export(&d).is_err());
        assert!(import("AAAA").is_err());
    }
}
