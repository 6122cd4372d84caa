mod common;

use std::sync::Arc;

use courier_client::session::Session;
use courier_client::transfer::{DownloadIter, SessionPool, UPLOAD_PART_SIZE, upload_bytes};
use courier_client::transport::BoxFuture;
use courier_client::InvocationError;
use courier_crypto::aes;
use courier_tl_types::{Deserializable, Identifiable, Serializable, enums, functions, types};
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;

use common::{Accept, Incoming, Loopback, loopback, session_config, start};

/// Every DC, CDN or not, is another connection on the same loopback.
struct Pool {
    connector: Arc<Loopback>,
}

impl Pool {
    fn open(&self) -> BoxFuture<'_, Result<Session, InvocationError>> {
        let session = Session::new(session_config(Arc::clone(&self.connector)));
        Box::pin(async move {
            session.start().await?;
            Ok(session)
        })
    }
}

impl SessionPool for Pool {
    fn media_session(&self, _dc_id: i32) -> BoxFuture<'_, Result<Session, InvocationError>> {
        self.open()
    }

    fn cdn_session(&self, _dc_id: i32) -> BoxFuture<'_, Result<Session, InvocationError>> {
        self.open()
    }
}

fn location() -> enums::InputFileLocation {
    types::InputDocumentFileLocation {
        id:             77,
        access_hash:    88,
        file_reference: vec![1, 2, 3],
        thumb_size:     String::new(),
    }
    .into()
}

fn parse<T: Deserializable + Identifiable>(req: &Incoming) -> T {
    assert_eq!(req.constructor_id(), T::CONSTRUCTOR_ID);
    T::from_bytes(&req.body[4..]).unwrap()
}

fn file(bytes: Vec<u8>) -> Vec<u8> {
    let file = types::upload::File { r#type: types::storage::FilePartial {}.into(), mtime: 0, bytes };
    enums::upload::File::from(file).to_bytes()
}

async fn home(pool: bool) -> (Session, Accept, common::ServerConn, DownloadIter) {
    let (connector, mut accept) = loopback();
    let session = Session::new(session_config(Arc::clone(&connector)));
    let server = start(&session, &mut accept).await;
    let pool: Option<Arc<dyn SessionPool>> = pool.then(|| Arc::new(Pool { connector }) as Arc<dyn SessionPool>);
    let iter = DownloadIter::new(session.clone(), pool, location(), Arc::new(Semaphore::new(1)));
    (session, accept, server, iter)
}

#[tokio::test]
async fn short_chunk_ends_the_download() {
    let (session, _accept, mut server, iter) = home(false).await;
    let download = tokio::spawn(iter.collect());

    let req = server.recv_request().await;
    let get: functions::upload::GetFile = parse(&req);
    assert_eq!((get.offset, get.cdn_supported), (0, false));
    server.reply(req.msg_id, &file(b"hello".to_vec())).await;

    assert_eq!(download.await.unwrap().unwrap(), b"hello");
    session.stop().await;
}

#[tokio::test]
async fn file_migrate_moves_the_download() {
    let (session, mut accept, mut server, iter) = home(true).await;
    let download = tokio::spawn(iter.collect());

    let req = server.recv_request().await;
    server.reply_error(req.msg_id, 303, "FILE_MIGRATE_4").await;

    let mut media = accept.next().await;
    media.serve_init().await;
    let req = media.recv_request().await;
    let get: functions::upload::GetFile = parse(&req);
    assert_eq!(get.location, location());
    media.reply(req.msg_id, &file(vec![7; 10])).await;

    assert_eq!(download.await.unwrap().unwrap(), vec![7; 10]);
    session.stop().await;
}

fn cdn_redirect(plain: &[u8], key: [u8; 32], iv: [u8; 16]) -> Vec<u8> {
    let hash = types::FileHash { offset: 0, limit: 128 * 1024, hash: Sha256::digest(plain).to_vec() };
    let redirect = types::upload::FileCdnRedirect {
        dc_id:          203,
        file_token:     b"token".to_vec(),
        encryption_key: key.to_vec(),
        encryption_iv:  iv.to_vec(),
        file_hashes:    vec![hash.into()],
    };
    enums::upload::File::from(redirect).to_bytes()
}

/// Serve one CDN download of `plain`, corrupting byte `tamper` if given.
async fn serve_cdn(server: &mut common::ServerConn, accept: &mut Accept, plain: &[u8], tamper: Option<usize>) {
    let (key, iv) = ([0x11; 32], [0x22; 16]);
    let req = server.recv_request().await;
    assert!(parse::<functions::upload::GetFile>(&req).cdn_supported);
    server.reply(req.msg_id, &cdn_redirect(plain, key, iv)).await;

    let mut cdn = accept.next().await;
    cdn.serve_init().await;
    let req = cdn.recv_request().await;
    let get: functions::upload::GetCdnFile = parse(&req);
    assert_eq!((get.file_token.as_slice(), get.offset), (&b"token"[..], 0));

    let mut bytes = plain.to_vec();
    aes::ctr256_decrypt(&mut bytes, &key, &aes::cdn_iv(&iv, 0));
    if let Some(at) = tamper {
        bytes[at] ^= 0xff;
    }
    let answer = enums::upload::CdnFile::from(types::upload::CdnFile { bytes });
    cdn.reply(req.msg_id, &answer.to_bytes()).await;
}

#[tokio::test]
async fn cdn_parts_are_decrypted_and_verified() {
    let plain: Vec<u8> = (0..300u32).map(|i| (i * 7) as u8).collect();
    let (session, mut accept, mut server, iter) = home(true).await;
    let download = tokio::spawn(iter.collect());

    serve_cdn(&mut server, &mut accept, &plain, None).await;

    assert_eq!(download.await.unwrap().unwrap(), plain);
    session.stop().await;
}

#[tokio::test]
async fn tampered_cdn_parts_are_rejected() {
    let plain = vec![0x42; 64];
    let (session, mut accept, mut server, iter) = home(true).await;
    let download = tokio::spawn(iter.collect());

    serve_cdn(&mut server, &mut accept, &plain, Some(17)).await;

    assert!(matches!(download.await.unwrap(), Err(InvocationError::CdnHashMismatch { offset: 0 })));
    session.stop().await;
}

#[tokio::test]
async fn uploads_are_split_into_parts() {
    let (connector, mut accept) = loopback();
    let session = Session::new(session_config(connector));
    let mut server = start(&session, &mut accept).await;

    let data: Vec<u8> = (0..UPLOAD_PART_SIZE + 100).map(|i| i as u8).collect();
    let upload = {
        let (session, data) = (session.clone(), data.clone());
        tokio::spawn(async move { upload_bytes(&session, &Semaphore::new(1), &data, "notes.txt").await })
    };

    let mut parts = Vec::new();
    for _ in 0..2 {
        let req = server.recv_request().await;
        parts.push(parse::<functions::upload::SaveFilePart>(&req));
        server.reply(req.msg_id, &true.to_bytes()).await;
    }

    let uploaded = upload.await.unwrap().unwrap();
    assert_eq!((uploaded.parts, uploaded.big), (2, false));
    assert!(parts.iter().all(|p| p.file_id == uploaded.file_id));
    assert_eq!(parts.iter().map(|p| p.file_part).collect::<Vec<_>>(), [0, 1]);
    assert_eq!([parts[0].bytes.as_slice(), parts[1].bytes.as_slice()].concat(), data);
    session.stop().await;
}
