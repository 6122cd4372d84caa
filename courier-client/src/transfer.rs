//! Chunked file transfer.
//!
//! ## Download
//! [`DownloadIter`] fetches a file in 1 MiB ranges with `upload.getFile`.
//! When the server answers with `upload.fileCdnRedirect` the rest of the
//! file comes from a CDN DC: parts arrive AES-256-CTR encrypted and every
//! slice is checked against the SHA-256 hashes the home DC publishes.
//!
//! ## Upload
//! [`upload_stream`] splits a byte source into 512 KiB parts. Files of
//! 10 MiB and more use the big-file calls.
//!
//! Both directions hold one permit of a shared [`Semaphore`] while active,
//! which bounds how many transfers run at once.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use courier_crypto::aes;
use courier_tl_types::{enums, functions, types};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::InvocationError;
use crate::session::{Session, random_i64};
use crate::transport::BoxFuture;

/// Bytes requested per `upload.getFile` call.
pub const DOWNLOAD_CHUNK_SIZE: i32 = 1024 * 1024;
/// Bytes per uploaded part.
pub const UPLOAD_PART_SIZE: usize = 512 * 1024;
/// Uploads of at least this size go through `upload.saveBigFilePart`.
pub const BIG_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Hands out sessions to DCs other than the home one.
pub trait SessionPool: Send + Sync + 'static {
    /// A started session to DC `dc_id`, authorized as the home account.
    fn media_session(&self, dc_id: i32) -> BoxFuture<'_, Result<Session, InvocationError>>;

    /// A started session to CDN DC `dc_id`.
    fn cdn_session(&self, dc_id: i32) -> BoxFuture<'_, Result<Session, InvocationError>>;
}

/// How many `FILE_MIGRATE_X` hops one download follows.
const MAX_FILE_MIGRATIONS: usize = 2;

fn invalid(msg: &str) -> InvocationError {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string()).into()
}

// ─── Download ─────────────────────────────────────────────────────────────────

struct Cdn {
    session:    Session,
    file_token: Vec<u8>,
    key:        [u8; 32],
    iv:         [u8; 16],
    /// Keyed by slice offset.
    hashes:     BTreeMap<i64, types::FileHash>,
}

impl Cdn {
    fn add_hashes(&mut self, hashes: Vec<enums::FileHash>) {
        for enums::FileHash::FileHash(h) in hashes {
            self.hashes.insert(h.offset, h);
        }
    }
}

/// Lazily downloads one file, chunk by chunk.
///
/// Not restartable: once [`next`](Self::next) returned `None` or an error
/// the iterator stays finished.
pub struct DownloadIter {
    session:   Session,
    pool:      Option<Arc<dyn SessionPool>>,
    location:  enums::InputFileLocation,
    offset:    i64,
    limit:     i32,
    cdn:       Option<Cdn>,
    semaphore: Arc<Semaphore>,
    permit:    Option<OwnedSemaphorePermit>,
    done:      bool,
}

impl DownloadIter {
    /// `pool` enables `FILE_MIGRATE_X` handling and the CDN path; without
    /// it the server never redirects.
    pub fn new(
        session:   Session,
        pool:      Option<Arc<dyn SessionPool>>,
        location:  enums::InputFileLocation,
        semaphore: Arc<Semaphore>,
    ) -> Self {
        Self {
            session,
            pool,
            location,
            offset: 0,
            limit: DOWNLOAD_CHUNK_SIZE,
            cdn: None,
            semaphore,
            permit: None,
            done: false,
        }
    }

    /// Start at `offset` instead of the beginning. Must be a multiple of 4096.
    pub fn skip_to(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Fetch the next chunk. `None` once the file is complete.
    pub async fn next(&mut self) -> Result<Option<Vec<u8>>, InvocationError> {
        if self.done {
            return Ok(None);
        }
        if self.permit.is_none() {
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| InvocationError::Dropped)?;
            self.permit = Some(permit);
        }

        let chunk = match self.fetch().await {
            Ok(chunk) => chunk,
            Err(e) => {
                self.finish();
                return Err(e);
            }
        };
        if chunk.len() < self.limit as usize {
            self.finish();
        }
        self.offset += i64::from(self.limit);
        Ok((!chunk.is_empty()).then_some(chunk))
    }

    /// Collect the remaining chunks.
    pub async fn collect(mut self) -> Result<Vec<u8>, InvocationError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    fn finish(&mut self) {
        self.done = true;
        self.permit = None;
    }

    async fn fetch(&mut self) -> Result<Vec<u8>, InvocationError> {
        if self.cdn.is_some() {
            return self.fetch_cdn().await;
        }
        let req = functions::upload::GetFile {
            precise:       false,
            cdn_supported: self.pool.is_some(),
            location:      self.location.clone(),
            offset:        self.offset,
            limit:         self.limit,
        };
        let mut hops = 0;
        let file = loop {
            match self.session.invoke(&req).await {
                Err(InvocationError::Rpc(e)) if e.is("FILE_MIGRATE") && hops < MAX_FILE_MIGRATIONS => {
                    let (Some(pool), Some(dc_id)) = (self.pool.as_ref(), e.migrate_dc()) else {
                        return Err(InvocationError::Rpc(e));
                    };
                    tracing::debug!("[courier] file lives on DC{dc_id}");
                    self.session = pool.media_session(dc_id).await?;
                    hops += 1;
                }
                other => break other?,
            }
        };
        match file {
            enums::upload::File::File(f) => Ok(f.bytes),
            enums::upload::File::CdnRedirect(r) => {
                let pool = self.pool.as_ref().ok_or_else(|| invalid("unexpected CDN redirect"))?;
                tracing::debug!("[courier] download redirected to CDN DC{}", r.dc_id);
                let session = pool.cdn_session(r.dc_id).await?;
                let mut cdn = Cdn {
                    session,
                    file_token: r.file_token,
                    key:        r.encryption_key.try_into().map_err(|_| invalid("CDN key is not 32 bytes"))?,
                    iv:         r.encryption_iv.try_into().map_err(|_| invalid("CDN IV is not 16 bytes"))?,
                    hashes:     BTreeMap::new(),
                };
                cdn.add_hashes(r.file_hashes);
                self.cdn = Some(cdn);
                self.fetch_cdn().await
            }
        }
    }

    async fn fetch_cdn(&mut self) -> Result<Vec<u8>, InvocationError> {
        let Some(cdn) = self.cdn.as_mut() else { return Err(invalid("no CDN redirect")) };
        loop {
            let req = functions::upload::GetCdnFile {
                file_token: cdn.file_token.clone(),
                offset:     self.offset,
                limit:      self.limit,
            };
            match cdn.session.invoke(&req).await? {
                enums::upload::CdnFile::ReuploadNeeded(r) => {
                    tracing::debug!("[courier] CDN asked for a reupload at offset {}", self.offset);
                    let req = functions::upload::ReuploadCdnFile {
                        file_token:    cdn.file_token.clone(),
                        request_token: r.request_token,
                    };
                    cdn.add_hashes(self.session.invoke(&req).await?);
                }
                enums::upload::CdnFile::File(f) => {
                    let mut bytes = f.bytes;
                    aes::ctr256_decrypt(&mut bytes, &cdn.key, &aes::cdn_iv(&cdn.iv, self.offset));
                    verify(&self.session, cdn, self.offset, &bytes).await?;
                    return Ok(bytes);
                }
            }
        }
    }
}

/// Check every hashed slice of `bytes`, which starts at `offset`.
async fn verify(home: &Session, cdn: &mut Cdn, offset: i64, bytes: &[u8]) -> Result<(), InvocationError> {
    let mut pos = 0usize;
    while pos < bytes.len() {
        let at = offset + pos as i64;
        if !cdn.hashes.contains_key(&at) {
            let req = functions::upload::GetCdnFileHashes { file_token: cdn.file_token.clone(), offset: at };
            cdn.add_hashes(home.invoke(&req).await?);
        }
        let hash = cdn.hashes.get(&at).ok_or(InvocationError::CdnHashMismatch { offset: at })?;
        let len = usize::try_from(hash.limit).unwrap_or(0).min(bytes.len() - pos);
        if len == 0 || Sha256::digest(&bytes[pos..pos + len]).as_slice() != hash.hash.as_slice() {
            tracing::warn!("[courier] CDN slice at offset {at} failed verification");
            return Err(InvocationError::CdnHashMismatch { offset: at });
        }
        pos += len;
    }
    Ok(())
}

// ─── Upload ───────────────────────────────────────────────────────────────────

/// Parts stored server-side, ready to be referenced as an `InputFile`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_id: i64,
    pub parts:   i32,
    pub name:    String,
    pub big:     bool,
}

impl UploadedFile {
    pub fn input_file(&self) -> enums::InputFile {
        if self.big {
            types::InputFileBig { id: self.file_id, parts: self.parts, name: self.name.clone() }.into()
        } else {
            types::InputFile {
                id:           self.file_id,
                parts:        self.parts,
                name:         self.name.clone(),
                md5_checksum: String::new(),
            }
            .into()
        }
    }
}

/// Upload `size` bytes read from `reader` as file `name`.
pub async fn upload_stream<R: AsyncRead + Unpin>(
    session:   &Session,
    semaphore: &Semaphore,
    reader:    &mut R,
    size:      u64,
    name:      &str,
) -> Result<UploadedFile, InvocationError> {
    let _permit = semaphore.acquire().await.map_err(|_| InvocationError::Dropped)?;

    let file_id = random_i64();
    let big = size >= BIG_FILE_THRESHOLD;
    let total = size.div_ceil(UPLOAD_PART_SIZE as u64).max(1);
    let total_parts = i32::try_from(total).map_err(|_| invalid("file too large"))?;

    let mut part = Vec::with_capacity(UPLOAD_PART_SIZE);
    for index in 0..total_parts {
        part.clear();
        (&mut *reader).take(UPLOAD_PART_SIZE as u64).read_to_end(&mut part).await?;
        if part.is_empty() && index > 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "source ended before the declared size").into());
        }
        let stored = if big {
            let req = functions::upload::SaveBigFilePart {
                file_id,
                file_part:        index,
                file_total_parts: total_parts,
                bytes:            part.clone(),
            };
            session.invoke(&req).await?
        } else {
            let req = functions::upload::SaveFilePart { file_id, file_part: index, bytes: part.clone() };
            session.invoke(&req).await?
        };
        if !stored {
            return Err(invalid("server refused a file part"));
        }
        tracing::debug!("[courier] uploaded part {}/{total_parts} of {name}", index + 1);
    }

    tracing::info!("[courier] uploaded {name} ({size} bytes, {total_parts} parts)");
    Ok(UploadedFile { file_id, parts: total_parts, name: name.to_string(), big })
}

/// Upload an in-memory buffer.
pub async fn upload_bytes(
    session:   &Session,
    semaphore: &Semaphore,
    data:      &[u8],
    name:      &str,
) -> Result<UploadedFile, InvocationError> {
    let mut reader = data;
    upload_stream(session, semaphore, &mut reader, data.len() as u64, name).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_files_use_the_big_input_file() {
        let small = UploadedFile { file_id: 1, parts: 2, name: "a.txt".into(), big: false };
        assert!(matches!(small.input_file(), enums::InputFile::File(f) if f.parts == 2));
        let big = UploadedFile { big: true, ..small };
        assert!(matches!(big.input_file(), enums::InputFile::Big(f) if f.name == "a.txt"));
    }
}
