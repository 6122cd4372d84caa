mod common;

use std::sync::Arc;
use std::time::Duration;

use courier_client::session::{Push, Session, SessionState};
use courier_client::{AutoSleep, InvocationError, MemoryStorage, Storage};
use courier_tl_types::{ContainerMessage, Deserializable, Identifiable, LogicalMessage, Serializable, enums, functions, types};
use tokio::sync::mpsc;

use common::{Accept, loopback, session_config, start};

fn ping_id_of(body: &[u8]) -> i64 {
    assert_eq!(&body[..4], &functions::Ping::CONSTRUCTOR_ID.to_le_bytes());
    functions::Ping::from_bytes(&body[4..]).unwrap().ping_id
}

async fn ping(session: &Session, ping_id: i64) -> Result<i64, InvocationError> {
    let enums::Pong::Pong(pong) = session.invoke(&functions::Ping { ping_id }).await?;
    Ok(pong.ping_id)
}

fn new_session() -> (Session, Accept) {
    let (connector, accept) = loopback();
    (Session::new(session_config(connector)), accept)
}

#[tokio::test]
async fn concurrent_requests_resolve_out_of_order() {
    let (session, mut accept) = new_session();
    let mut server = start(&session, &mut accept).await;
    assert_eq!(session.state(), SessionState::Connected);

    let calls = {
        let session = session.clone();
        tokio::spawn(async move { tokio::join!(ping(&session, 1), ping(&session, 2), ping(&session, 3)) })
    };

    let mut requests = Vec::new();
    while requests.len() < 3 {
        requests.push(server.recv_request().await);
    }
    assert_eq!(session.in_flight(), 3);

    // All answers in one container, newest request first.
    let answers = requests
        .iter()
        .rev()
        .enumerate()
        .map(|(i, req)| {
            let pong = types::Pong { msg_id: req.msg_id, ping_id: ping_id_of(&req.body) };
            ContainerMessage {
                msg_id: (1 << 33) + (i as i64) * 4 + 1,
                seqno:  (i as i32) * 2 + 1,
                body:   LogicalMessage::RpcResult { req_msg_id: req.msg_id, result: pong.to_bytes() }.encode(),
            }
        })
        .collect();
    server.send(&LogicalMessage::Container(answers).encode(), false).await;

    let (a, b, c) = calls.await.unwrap();
    assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (1, 2, 3));
    assert_eq!(session.in_flight(), 0);
    session.stop().await;
}

#[tokio::test]
async fn rpc_errors_reach_the_caller() {
    let (session, mut accept) = new_session();
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 9).await })
    };
    let req = server.recv_request().await;
    server.reply_error(req.msg_id, 400, "PEER_ID_INVALID").await;

    match call.await.unwrap() {
        Err(InvocationError::Rpc(e)) => {
            assert_eq!(e.code, 400);
            assert!(e.is("PEER_ID_*"));
        }
        other => panic!("unexpected {other:?}"),
    }
    session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn short_flood_waits_are_slept_through() {
    let (connector, mut accept) = loopback();
    let mut config = session_config(connector);
    config.retry_policy = Arc::new(AutoSleep);
    let session = Session::new(config);
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 5).await })
    };
    let first = server.recv_request().await;
    server.reply_error(first.msg_id, 420, "FLOOD_WAIT_3").await;

    let second = server.recv_request().await;
    assert_ne!(second.msg_id, first.msg_id);
    let pong = types::Pong { msg_id: second.msg_id, ping_id: 5 };
    server.reply(second.msg_id, &pong.to_bytes()).await;

    assert_eq!(call.await.unwrap().unwrap(), 5);
    session.stop().await;
}

#[tokio::test(start_paused = true)]
async fn long_flood_waits_are_returned() {
    let (connector, mut accept) = loopback();
    let mut config = session_config(connector);
    config.retry_policy = Arc::new(AutoSleep);
    let session = Session::new(config);
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 5).await })
    };
    let req = server.recv_request().await;
    server.reply_error(req.msg_id, 420, "FLOOD_WAIT_30").await;

    let err = call.await.unwrap().unwrap_err();
    assert_eq!(err.flood_wait_seconds(), Some(30));
    session.stop().await;
}

#[tokio::test]
async fn bad_server_salt_resends_under_the_new_salt() {
    let (session, mut accept) = new_session();
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 11).await })
    };
    let first = server.recv_request().await;
    let bad = types::BadServerSalt {
        bad_msg_id:      first.msg_id,
        bad_msg_seqno:   first.seq_no,
        error_code:      48,
        new_server_salt: 0x7777,
    };
    server.send(&bad.to_bytes(), false).await;

    let again = server.recv_request().await;
    assert_eq!(again.salt, 0x7777);
    assert_ne!(again.msg_id, first.msg_id);
    assert_eq!(ping_id_of(&again.body), 11);

    let pong = types::Pong { msg_id: again.msg_id, ping_id: 11 };
    server.reply(again.msg_id, &pong.to_bytes()).await;
    assert_eq!(call.await.unwrap().unwrap(), 11);
    session.stop().await;
}

#[tokio::test]
async fn cancelled_calls_leave_no_pending_entry() {
    let (session, mut accept) = new_session();
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 1).await })
    };
    let req = server.recv_request().await;
    assert_eq!(session.in_flight(), 1);

    call.abort();
    assert!(call.await.unwrap_err().is_cancelled());
    assert_eq!(session.in_flight(), 0);

    // A late answer is dropped without effect.
    let pong = types::Pong { msg_id: req.msg_id, ping_id: 1 };
    server.reply(req.msg_id, &pong.to_bytes()).await;
    session.stop().await;
}

#[tokio::test]
async fn unanswered_calls_time_out() {
    let (connector, mut accept) = loopback();
    let mut config = session_config(connector);
    config.request_timeout = Duration::from_millis(200);
    let session = Session::new(config);
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 1).await })
    };
    server.recv_request().await;
    assert!(matches!(call.await.unwrap(), Err(InvocationError::Timeout)));
    assert_eq!(session.in_flight(), 0);
    session.stop().await;
}

#[tokio::test]
async fn stop_fails_in_flight_requests() {
    let (session, mut accept) = new_session();
    let mut server = start(&session, &mut accept).await;

    let call = {
        let session = session.clone();
        tokio::spawn(async move { ping(&session, 1).await })
    };
    server.recv_request().await;
    session.stop().await;

    assert!(matches!(call.await.unwrap(), Err(InvocationError::Dropped)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(matches!(session.start().await, Err(InvocationError::Dropped)));
}

#[tokio::test]
async fn pushed_updates_are_forwarded() {
    let (connector, mut accept) = loopback();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut config = session_config(connector);
    config.push_tx = Some(tx);
    let session = Session::new(config);
    let mut server = start(&session, &mut accept).await;

    server.send(&types::UpdatesTooLong {}.to_bytes(), true).await;
    // The content-related push is acknowledged.
    let ack = server.recv().await;
    assert_eq!(ack.constructor_id(), types::MsgsAck::CONSTRUCTOR_ID);

    match rx.recv().await {
        Some(Push::Updates(enums::Updates::TooLong(_))) => {}
        other => panic!("unexpected {other:?}"),
    }
    session.stop().await;
}

#[tokio::test]
async fn undecodable_updates_force_a_difference() {
    let (connector, mut accept) = loopback();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut config = session_config(connector);
    config.push_tx = Some(tx);
    let session = Session::new(config);
    let mut server = start(&session, &mut accept).await;

    // updateShort carrying an update tag outside the schema.
    let mut body = types::UpdateShort::CONSTRUCTOR_ID.to_le_bytes().to_vec();
    body.extend_from_slice(&0xdead_beef_u32.to_le_bytes());
    body.extend_from_slice(&[0; 8]);
    server.send(&body, true).await;

    match rx.recv().await {
        Some(Push::Updates(enums::Updates::TooLong(_))) => {}
        other => panic!("unexpected {other:?}"),
    }
    session.stop().await;
}

#[tokio::test]
async fn rejected_key_is_forgotten_and_renegotiated() {
    let (connector, mut accept) = loopback();
    let storage = Arc::new(MemoryStorage::new());
    storage.set_auth_key(Some(&common::KEY[..])).unwrap();

    let mut config = session_config(connector);
    config.storage = Some(storage.clone());
    let session = Session::new(config);
    let mut server = start(&session, &mut accept).await;

    server.send_transport_error(-404).await;

    // The reconnect comes without a key and opens with req_pq_multi.
    let mut next = accept.next().await;
    let hello = next.recv_plain().await;
    assert_eq!(&hello.body[..4], &functions::ReqPqMulti::CONSTRUCTOR_ID.to_le_bytes());
    assert_eq!(storage.auth_key().unwrap(), None);
    assert_eq!(session.auth_key(), None);
    assert_eq!(session.state(), SessionState::Handshaking);

    session.stop().await;
}
