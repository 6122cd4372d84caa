//! Sans-IO MTProto authorization key generation.
//!
//! # Flow
//!
//! ```text
//! let (req, s1) = authentication::step1()?;
//! // send req_pq_multi, receive resPQ
//! let (req, s2) = authentication::step2(s1, res_pq)?;
//! // send req_DH_params, receive server_DH_params
//! let (mut req, mut s3) = authentication::step3(s2, dh_params)?;
//! loop {
//!     // send set_client_DH_params, receive the answer
//!     match authentication::finish(s3, answer)? {
//!         Outcome::Done(done) => break done,
//!         Outcome::Retry(retry) => (req, s3) = authentication::retry_step3(retry)?,
//!     }
//! }
//! ```
//!
//! Nothing here performs I/O; the caller owns the connection and bounds the
//! number of `dh_gen_retry` rounds with [`MAX_DH_RETRIES`].

use std::time::{SystemTime, UNIX_EPOCH};

use courier_crypto::{AuthKey, aes, factorize, generate_key_data_from_nonce, rsa, sha1};
use courier_tl_types::{Cursor, Deserializable, Serializable, enums, functions, types};
use num_bigint::BigUint;
use num_traits::One;

/// How many `dh_gen_retry` answers are tolerated before giving up.
pub const MAX_DH_RETRIES: usize = 5;

// ─── Error ────────────────────────────────────────────────────────────────────

/// Errors that can occur during auth key generation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("nonce mismatch")]
    InvalidNonce,
    #[error("server_nonce mismatch")]
    InvalidServerNonce,
    #[error("pq size {size} invalid (expected 8)")]
    InvalidPqSize { size: usize },
    #[error("pq {pq} could not be factorized")]
    Factorization { pq: u64 },
    #[error("no trusted key among fingerprints {fingerprints:?}")]
    UnknownFingerprints { fingerprints: Vec<i64> },
    #[error("server returned DH params failure")]
    DhParamsFail,
    #[error("encrypted answer len {len} is not 16-byte aligned")]
    EncryptedResponseNotPadded { len: usize },
    #[error("DH inner data deserialization error: {0}")]
    InvalidDhInnerData(#[from] courier_tl_types::deserialize::Error),
    #[error("answer hash mismatch")]
    InvalidAnswerHash,
    #[error("g = {g} outside 2..=7")]
    InvalidGenerator { g: i32 },
    #[error("{name} outside the safe DH range")]
    ParameterOutOfRange { name: &'static str },
    #[error("new nonce hash mismatch")]
    InvalidNewNonceHash,
    #[error("server rejected the key exchange (dh_gen_fail)")]
    DhGenFail,
}

// ─── Step state ──────────────────────────────────────────────────────────────

/// State after step 1.
pub struct Step1 {
    nonce: [u8; 16],
}

/// State after step 2.
pub struct Step2 {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
}

/// Validated server DH parameters, kept so a retry can reuse them.
#[derive(Clone)]
struct Exchange {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
    g: BigUint,
    dh_prime: BigUint,
    g_a: BigUint,
    key: [u8; 32],
    iv: [u8; 32],
    time_offset: i32,
}

/// State after step 3.
pub struct Step3 {
    exchange: Exchange,
    gab: BigUint,
}

/// The server asked for another `set_client_DH_params` round.
pub struct Step2Retry {
    exchange: Exchange,
    retry_id: i64,
}

impl Step2Retry {
    /// `aux_hash` of the rejected key, sent back as `retry_id`.
    pub fn retry_id(&self) -> i64 {
        self.retry_id
    }
}

/// The final output of a successful auth key handshake.
#[derive(Clone, Debug, PartialEq)]
pub struct Finished {
    pub auth_key: [u8; 256],
    /// Server clock minus local clock, in seconds.
    pub time_offset: i32,
    /// `new_nonce[..8] XOR server_nonce[..8]`.
    pub first_salt: i64,
}

/// Result of feeding the `set_client_DH_params` answer to [`finish`].
pub enum Outcome {
    Done(Finished),
    Retry(Step2Retry),
}

fn random<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf).expect("OS random source unavailable");
    buf
}

// ─── Step 1: req_pq_multi ────────────────────────────────────────────────────

pub fn step1() -> Result<(functions::ReqPqMulti, Step1), Error> {
    do_step1(&random())
}

fn do_step1(random: &[u8; 16]) -> Result<(functions::ReqPqMulti, Step1), Error> {
    let nonce = *random;
    Ok((functions::ReqPqMulti { nonce }, Step1 { nonce }))
}

// ─── Step 2: req_DH_params ───────────────────────────────────────────────────

/// Process `resPQ`: factorize `pq` and RSA-encrypt the inner data under the
/// first server key we trust.
pub fn step2(data: Step1, response: enums::ResPq) -> Result<(functions::ReqDhParams, Step2), Error> {
    do_step2(data, response, &random())
}

fn do_step2(
    data: Step1,
    response: enums::ResPq,
    random: &[u8; 256],
) -> Result<(functions::ReqDhParams, Step2), Error> {
    let Step1 { nonce } = data;
    let enums::ResPq::ResPq(res_pq) = response;

    check_nonce(&res_pq.nonce, &nonce)?;

    let pq_bytes: [u8; 8] = res_pq
        .pq
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidPqSize { size: res_pq.pq.len() })?;
    let pq = u64::from_be_bytes(pq_bytes);

    let (fingerprint, key) = res_pq
        .server_public_key_fingerprints
        .iter()
        .find_map(|&fp| key_for_fingerprint(fp).map(|k| (fp, k)))
        .ok_or_else(|| Error::UnknownFingerprints {
            fingerprints: res_pq.server_public_key_fingerprints.clone(),
        })?;

    let (p, q) = factorize(pq).ok_or(Error::Factorization { pq })?;

    let mut new_nonce = [0u8; 32];
    new_nonce.copy_from_slice(&random[..32]);
    let mut rnd224 = [0u8; 224];
    rnd224.copy_from_slice(&random[32..]);

    let p_bytes = trim_be(p);
    let q_bytes = trim_be(q);

    let pq_inner = enums::PQInnerData::from(types::PQInnerData {
        pq: res_pq.pq.clone(),
        p: p_bytes.clone(),
        q: q_bytes.clone(),
        nonce,
        server_nonce: res_pq.server_nonce,
        new_nonce,
    })
    .to_bytes();

    // The inner data is far below the RSA-PAD limit.
    let encrypted_data = rsa::encrypt_hashed(&pq_inner, &key, &rnd224)
        .ok_or(Error::InvalidPqSize { size: pq_inner.len() })?;

    log::debug!("[courier] step2: pq factorized, using key {fingerprint}");

    Ok((
        functions::ReqDhParams {
            nonce,
            server_nonce: res_pq.server_nonce,
            p: p_bytes,
            q: q_bytes,
            public_key_fingerprint: fingerprint,
            encrypted_data,
        },
        Step2 { nonce, server_nonce: res_pq.server_nonce, new_nonce },
    ))
}

fn trim_be(v: u64) -> Vec<u8> {
    let b = v.to_be_bytes();
    let skip = b.iter().position(|&x| x != 0).unwrap_or(7);
    b[skip..].to_vec()
}

// ─── Step 3: set_client_DH_params ────────────────────────────────────────────

/// Process `server_DH_params`: decrypt and validate the server's DH half,
/// then produce ours.
pub fn step3(data: Step2, response: enums::ServerDhParams) -> Result<(functions::SetClientDhParams, Step3), Error> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i32;
    let exchange = open_server_dh(data, response, now)?;
    build_client_dh(exchange, 0, &random())
}

/// Answer a `dh_gen_retry` with a fresh `b` over the same server parameters.
pub fn retry_step3(retry: Step2Retry) -> Result<(functions::SetClientDhParams, Step3), Error> {
    build_client_dh(retry.exchange, retry.retry_id, &random())
}

fn open_server_dh(data: Step2, response: enums::ServerDhParams, now: i32) -> Result<Exchange, Error> {
    let Step2 { nonce, server_nonce, new_nonce } = data;

    let mut server_dh_ok = match response {
        enums::ServerDhParams::Fail(f) => {
            check_nonce(&f.nonce, &nonce)?;
            check_server_nonce(&f.server_nonce, &server_nonce)?;
            let digest = sha1!(new_nonce);
            if f.new_nonce_hash[..] != digest[4..] {
                return Err(Error::InvalidNewNonceHash);
            }
            return Err(Error::DhParamsFail);
        }
        enums::ServerDhParams::Ok(x) => x,
    };

    check_nonce(&server_dh_ok.nonce, &nonce)?;
    check_server_nonce(&server_dh_ok.server_nonce, &server_nonce)?;

    let len = server_dh_ok.encrypted_answer.len();
    if len % 16 != 0 || len < 20 {
        return Err(Error::EncryptedResponseNotPadded { len });
    }

    let (key, iv) = generate_key_data_from_nonce(&server_nonce, &new_nonce);
    aes::ige_decrypt(&mut server_dh_ok.encrypted_answer, &key, &iv);
    let plain = server_dh_ok.encrypted_answer;

    let mut cursor = Cursor::from_slice(&plain[20..]);
    let enums::ServerDhInnerData::ServerDhInnerData(inner) = enums::ServerDhInnerData::deserialize(&mut cursor)?;

    if plain[..20] != sha1!(&plain[20..20 + cursor.pos()]) {
        return Err(Error::InvalidAnswerHash);
    }

    check_nonce(&inner.nonce, &nonce)?;
    check_server_nonce(&inner.server_nonce, &server_nonce)?;

    if !(2..=7).contains(&inner.g) {
        return Err(Error::InvalidGenerator { g: inner.g });
    }
    let g = BigUint::from(inner.g as u32);
    let dh_prime = BigUint::from_bytes_be(&inner.dh_prime);
    let g_a = BigUint::from_bytes_be(&inner.g_a);
    check_safe_range("g_a", &g_a, &dh_prime)?;

    Ok(Exchange {
        nonce,
        server_nonce,
        new_nonce,
        g,
        dh_prime,
        g_a,
        key,
        iv,
        time_offset: inner.server_time - now,
    })
}

fn build_client_dh(
    exchange: Exchange,
    retry_id: i64,
    random: &[u8; 272],
) -> Result<(functions::SetClientDhParams, Step3), Error> {
    let b = BigUint::from_bytes_be(&random[..256]);
    let g_b = exchange.g.modpow(&b, &exchange.dh_prime);
    check_safe_range("g_b", &g_b, &exchange.dh_prime)?;
    let gab = exchange.g_a.modpow(&b, &exchange.dh_prime);

    let client_dh_inner = enums::ClientDhInnerData::from(types::ClientDhInnerData {
        nonce: exchange.nonce,
        server_nonce: exchange.server_nonce,
        retry_id,
        g_b: g_b.to_bytes_be(),
    })
    .to_bytes();

    let pad_len = (16 - ((20 + client_dh_inner.len()) % 16)) % 16;
    let mut hashed = Vec::with_capacity(20 + client_dh_inner.len() + pad_len);
    hashed.extend_from_slice(&sha1!(&client_dh_inner));
    hashed.extend_from_slice(&client_dh_inner);
    hashed.extend_from_slice(&random[256..256 + pad_len]);

    aes::ige_encrypt(&mut hashed, &exchange.key, &exchange.iv);

    Ok((
        functions::SetClientDhParams {
            nonce: exchange.nonce,
            server_nonce: exchange.server_nonce,
            encrypted_data: hashed,
        },
        Step3 { exchange, gab },
    ))
}

// ─── finish: create_key ──────────────────────────────────────────────────────

/// Check the server's verdict on our DH half.
pub fn finish(data: Step3, response: enums::SetClientDhParamsAnswer) -> Result<Outcome, Error> {
    let Step3 { exchange, gab } = data;

    let (nonce, server_nonce, hash, number) = match response {
        enums::SetClientDhParamsAnswer::DhGenOk(x) => (x.nonce, x.server_nonce, x.new_nonce_hash1, 1),
        enums::SetClientDhParamsAnswer::DhGenRetry(x) => (x.nonce, x.server_nonce, x.new_nonce_hash2, 2),
        enums::SetClientDhParamsAnswer::DhGenFail(x) => (x.nonce, x.server_nonce, x.new_nonce_hash3, 3),
    };

    check_nonce(&nonce, &exchange.nonce)?;
    check_server_nonce(&server_nonce, &exchange.server_nonce)?;

    let mut key_bytes = [0u8; 256];
    let gab_bytes = gab.to_bytes_be();
    key_bytes[256 - gab_bytes.len()..].copy_from_slice(&gab_bytes);
    let auth_key = AuthKey::from_bytes(key_bytes);

    if hash != auth_key.calc_new_nonce_hash(&exchange.new_nonce, number) {
        return Err(Error::InvalidNewNonceHash);
    }

    match number {
        1 => {
            let mut salt = [0u8; 8];
            for ((dst, a), b) in salt.iter_mut().zip(&exchange.new_nonce[..8]).zip(&exchange.server_nonce[..8]) {
                *dst = a ^ b;
            }
            Ok(Outcome::Done(Finished {
                auth_key: key_bytes,
                time_offset: exchange.time_offset,
                first_salt: i64::from_le_bytes(salt),
            }))
        }
        2 => {
            log::info!("[courier] server asked for DH retry");
            Ok(Outcome::Retry(Step2Retry { retry_id: auth_key.aux_hash(), exchange }))
        }
        _ => Err(Error::DhGenFail),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn check_nonce(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected { Ok(()) } else { Err(Error::InvalidNonce) }
}

fn check_server_nonce(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected { Ok(()) } else { Err(Error::InvalidServerNonce) }
}

/// `1 < v < dh_prime - 1` and `2^(2048-64) < v < dh_prime - 2^(2048-64)`.
fn check_safe_range(name: &'static str, v: &BigUint, dh_prime: &BigUint) -> Result<(), Error> {
    let one = BigUint::one();
    let safety = BigUint::one() << (2048u32 - 64);
    // The prime must leave room for the safety margin on both ends before
    // anything is subtracted from it.
    let ok = dh_prime > &(&safety << 1u32)
        && &one < v
        && v < &(dh_prime - &one)
        && &safety < v
        && v < &(dh_prime - &safety);
    if ok { Ok(()) } else { Err(Error::ParameterOutOfRange { name }) }
}

/// RSA key by server fingerprint. Includes both production and test DC keys.
#[allow(clippy::unreadable_literal)]
pub fn key_for_fingerprint(fp: i64) -> Option<rsa::Key> {
    Some(match fp {
        // Production DC key (fingerprint -3414540481677951611)
        -3414540481677951611 => rsa::Key::new(
            "29379598170669337022986177149456128565388431120058863768162556424047512191330847455146576344487764408661701890505066208632169112269581063774293102577308490531282748465986139880977280302242772832972539403531316010870401287642763009136156734339538042419388722777357134487746169093539093850251243897188928735903389451772730245253062963384108812842079887538976360465290946139638691491496062099570836476454855996319192747663615955633778034897140982517446405334423701359108810182097749467210509584293428076654573384828809574217079944388301239431309115013843331317877374435868468779972014486325557807783825502498215169806323",
            "65537"
        )?,
        // Test DC key (fingerprint -5595554452916591101)
        -5595554452916591101 => rsa::Key::new(
            "25342889448840415564971689590713473206898847759084779052582026594546022463853940585885215951168491965708222649399180603818074200620463776135424884632162512403163793083921641631564740959529419359595852941166848940585952337613333022396096584117954892216031229237302943701877588456738335398602461675225081791820393153757504952636234951323237820036543581047826906120927972487366805292115792231423684261262330394324750785450942589751755390156647751460719351439969059949569615302809050721500330239005077889855323917509948255722081644689442127297605422579707142646660768825302832201908302295573257427896031830742328565032949",
            "65537"
        )?,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONCE: [u8; 16] = [1; 16];
    const SERVER_NONCE: [u8; 16] = [2; 16];
    const NEW_NONCE: [u8; 32] = [3; 32];

    fn res_pq(pq: Vec<u8>, fingerprints: Vec<i64>) -> enums::ResPq {
        types::ResPq { nonce: NONCE, server_nonce: SERVER_NONCE, pq, server_public_key_fingerprints: fingerprints }
            .into()
    }

    fn step2_state() -> Step2 {
        Step2 { nonce: NONCE, server_nonce: SERVER_NONCE, new_nonce: NEW_NONCE }
    }

    /// 2^2048 - 1: not prime, but exercises the same arithmetic.
    fn prime() -> BigUint {
        (BigUint::one() << 2048u32) - BigUint::one()
    }

    fn server_secret() -> BigUint {
        BigUint::from_bytes_be(&[0x35; 256])
    }

    /// `server_DH_params_ok` as the server would send it.
    fn server_dh_ok(server_time: i32) -> enums::ServerDhParams {
        let g_a = BigUint::from(3u32).modpow(&server_secret(), &prime());
        let inner = enums::ServerDhInnerData::from(types::ServerDhInnerData {
            nonce: NONCE,
            server_nonce: SERVER_NONCE,
            g: 3,
            dh_prime: prime().to_bytes_be(),
            g_a: g_a.to_bytes_be(),
            server_time,
        })
        .to_bytes();

        let mut answer = sha1!(&inner).to_vec();
        answer.extend_from_slice(&inner);
        answer.resize(answer.len().div_ceil(16) * 16, 0);
        let (key, iv) = generate_key_data_from_nonce(&SERVER_NONCE, &NEW_NONCE);
        aes::ige_encrypt(&mut answer, &key, &iv);

        types::ServerDhParamsOk { nonce: NONCE, server_nonce: SERVER_NONCE, encrypted_answer: answer }.into()
    }

    fn open_client_dh(req: &functions::SetClientDhParams) -> types::ClientDhInnerData {
        let (key, iv) = generate_key_data_from_nonce(&SERVER_NONCE, &NEW_NONCE);
        let mut plain = req.encrypted_data.clone();
        aes::ige_decrypt(&mut plain, &key, &iv);
        let mut cursor = Cursor::from_slice(&plain[20..]);
        let enums::ClientDhInnerData::ClientDhInnerData(inner) =
            enums::ClientDhInnerData::deserialize(&mut cursor).unwrap();
        assert_eq!(plain[..20], sha1!(&plain[20..20 + cursor.pos()]));
        inner
    }

    fn key_from(gab: &BigUint) -> AuthKey {
        let mut bytes = [0u8; 256];
        let raw = gab.to_bytes_be();
        bytes[256 - raw.len()..].copy_from_slice(&raw);
        AuthKey::from_bytes(bytes)
    }

    fn step3_state() -> (functions::SetClientDhParams, Step3) {
        let exchange = open_server_dh(step2_state(), server_dh_ok(1_000_005), 1_000_000).unwrap();
        build_client_dh(exchange, 0, &[0x47; 272]).unwrap()
    }

    #[test]
    fn step1_echoes_nonce() {
        let (req, state) = do_step1(&NONCE).unwrap();
        assert_eq!(req.nonce, NONCE);
        assert_eq!(state.nonce, NONCE);
    }

    #[test]
    fn step2_rejects_foreign_nonce() {
        let step1 = Step1 { nonce: [9; 16] };
        let res = do_step2(step1, res_pq(vec![0; 8], vec![-3414540481677951611]), &[0; 256]);
        assert!(matches!(res, Err(Error::InvalidNonce)));
    }

    #[test]
    fn step2_rejects_short_pq() {
        let res = do_step2(Step1 { nonce: NONCE }, res_pq(vec![1, 2, 3, 4], vec![]), &[0; 256]);
        assert!(matches!(res, Err(Error::InvalidPqSize { size: 4 })));
    }

    #[test]
    fn step2_requires_a_known_key() {
        let pq = (999_983u64 * 1_000_003).to_be_bytes().to_vec();
        let res = do_step2(Step1 { nonce: NONCE }, res_pq(pq, vec![42, 43]), &[0; 256]);
        assert!(matches!(res, Err(Error::UnknownFingerprints { fingerprints }) if fingerprints == [42, 43]));
    }

    #[test]
    fn step2_splits_pq_smallest_first() {
        let pq = (1_000_003u64 * 999_983).to_be_bytes().to_vec();
        let (req, state) =
            do_step2(Step1 { nonce: NONCE }, res_pq(pq, vec![42, -3414540481677951611]), &[7; 256]).unwrap();
        assert_eq!(req.p, trim_be(999_983));
        assert_eq!(req.q, trim_be(1_000_003));
        assert_eq!(req.public_key_fingerprint, -3414540481677951611);
        assert_eq!(req.encrypted_data.len(), 256);
        assert_eq!(state.new_nonce, [7; 32]);
    }

    #[test]
    fn server_dh_failure_is_reported() {
        let digest = sha1!(NEW_NONCE);
        let mut new_nonce_hash = [0u8; 16];
        new_nonce_hash.copy_from_slice(&digest[4..]);
        let fail = types::ServerDhParamsFail { nonce: NONCE, server_nonce: SERVER_NONCE, new_nonce_hash };
        let res = open_server_dh(step2_state(), fail.into(), 0);
        assert!(matches!(res, Err(Error::DhParamsFail)));
    }

    #[test]
    fn server_dh_answer_sets_clock_offset() {
        let exchange = open_server_dh(step2_state(), server_dh_ok(1_000_005), 1_000_000).unwrap();
        assert_eq!(exchange.time_offset, 5);
        assert_eq!(exchange.g, BigUint::from(3u32));
    }

    #[test]
    fn tampered_answer_is_rejected() {
        let enums::ServerDhParams::Ok(mut ok) = server_dh_ok(0) else { unreachable!() };
        let last = ok.encrypted_answer.len() - 1;
        ok.encrypted_answer[last - 20] ^= 0x10;
        let res = open_server_dh(step2_state(), ok.into(), 0);
        assert!(res.is_err());
    }

    #[test]
    fn both_sides_agree_on_the_key() {
        let (req, state) = step3_state();
        let inner = open_client_dh(&req);
        assert_eq!(inner.retry_id, 0);
        let g_b = BigUint::from_bytes_be(&inner.g_b);
        assert_eq!(g_b.modpow(&server_secret(), &prime()), state.gab);
    }

    #[test]
    fn dh_gen_ok_finishes() {
        let (_, state) = step3_state();
        let key = key_from(&state.gab);
        let answer = types::DhGenOk {
            nonce: NONCE,
            server_nonce: SERVER_NONCE,
            new_nonce_hash1: key.calc_new_nonce_hash(&NEW_NONCE, 1),
        };
        let Ok(Outcome::Done(done)) = finish(state, answer.into()) else { panic!("expected Done") };
        assert_eq!(done.auth_key, key.to_bytes());
        assert_eq!(done.time_offset, 5);
        assert_eq!(done.first_salt, i64::from_le_bytes([3 ^ 2; 8]));
    }

    #[test]
    fn dh_gen_retry_carries_aux_hash() {
        let (_, state) = step3_state();
        let key = key_from(&state.gab);
        let answer = types::DhGenRetry {
            nonce: NONCE,
            server_nonce: SERVER_NONCE,
            new_nonce_hash2: key.calc_new_nonce_hash(&NEW_NONCE, 2),
        };
        let Ok(Outcome::Retry(retry)) = finish(state, answer.into()) else { panic!("expected Retry") };
        assert_eq!(retry.retry_id(), key.aux_hash());

        let (req, _) = retry_step3(retry).unwrap();
        assert_eq!(open_client_dh(&req).retry_id, key.aux_hash());
    }

    #[test]
    fn dh_gen_fail_and_bad_hashes() {
        let (_, state) = step3_state();
        let key = key_from(&state.gab);
        let answer = types::DhGenFail {
            nonce: NONCE,
            server_nonce: SERVER_NONCE,
            new_nonce_hash3: key.calc_new_nonce_hash(&NEW_NONCE, 3),
        };
        assert!(matches!(finish(state, answer.into()), Err(Error::DhGenFail)));

        let (_, state) = step3_state();
        let answer = types::DhGenOk { nonce: NONCE, server_nonce: SERVER_NONCE, new_nonce_hash1: [0; 16] };
        assert!(matches!(finish(state, answer.into()), Err(Error::InvalidNewNonceHash)));
    }

    #[test]
    fn safe_range_bounds() {
        let p = prime();
        assert!(check_safe_range("x", &BigUint::one(), &p).is_err());
        assert!(check_safe_range("x", &(&p - BigUint::one()), &p).is_err());
        assert!(check_safe_range("x", &(BigUint::one() << 2000u32), &p).is_ok());
        assert!(check_safe_range("x", &BigUint::from(5u32), &BigUint::from(23u32)).is_err());
    }

    #[test]
    fn both_known_keys_parse() {
        assert!(key_for_fingerprint(-3414540481677951611).is_some());
        assert!(key_for_fingerprint(-5595554452916591101).is_some());
        assert!(key_for_fingerprint(1).is_none());
    }
}
