use std::future::Ready;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier_client::dispatcher::Dispatcher;
use courier_client::update::{Envelope, Peer, tables};
use courier_client::{Handler, HandlerError, HandlerKind, MemoryStorage, PeerCache, Update};
use courier_tl_types::{enums, types};
use tokio::sync::{Notify, mpsc, oneshot};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn dispatcher() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(Arc::new(PeerCache::new(Arc::new(MemoryStorage::new()))), 16))
}

fn raw_update() -> Envelope {
    Envelope::bare(types::UpdateMessageId { id: 1, random_id: 2 }.into())
}

fn new_message(id: i32, text: &str) -> Envelope {
    let message = types::Message {
        from_id: Some(types::PeerUser { user_id: 7 }.into()),
        ..types::Message::new(id, types::PeerUser { user_id: 7 }.into(), 0, text)
    };
    let update = types::UpdateNewMessage { message: message.into(), pts: 1, pts_count: 1 }.into();
    let user: enums::User = types::User { id: 7, first_name: Some("Ada".into()), ..Default::default() }.into();
    let (users, chats) = tables(&[user], &[]);
    Envelope::new(update, users, chats)
}

/// A raw handler that logs `name` and answers with `result`.
fn logging(log: &Log, name: &'static str, result: fn() -> Result<(), HandlerError>) -> Handler {
    let log = Arc::clone(log);
    Handler::new(HandlerKind::Raw, move |_| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(name);
            result()
        }
    })
}

#[tokio::test]
async fn groups_run_in_order_and_propagation_is_honoured() {
    let d = dispatcher();
    let log: Log = Arc::default();

    d.add_handler(1, logging(&log, "g1-stop", || Err(HandlerError::StopPropagation))).await;
    d.add_handler(2, logging(&log, "g2-never", || Ok(()))).await;
    d.add_handler(0, logging(&log, "g0-continue", || Err(HandlerError::ContinuePropagation))).await;
    d.add_handler(0, logging(&log, "g0-handled", || Ok(()))).await;
    d.add_handler(0, logging(&log, "g0-skipped", || Ok(()))).await;
    d.add_handler(-1, logging(&log, "g-1-failed", || Err(HandlerError::Failed("boom".into())))).await;

    d.dispatch(raw_update()).await;
    assert_eq!(*log.lock().unwrap(), ["g-1-failed", "g0-continue", "g0-handled", "g1-stop"]);
}

#[tokio::test]
async fn filters_and_kinds_select_the_handler() {
    let d = dispatcher();
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));

    d.add_handler(0, Handler::new(HandlerKind::CallbackQuery, |_| -> Ready<_> { panic!("wrong kind") })).await;
    d.add_handler(
        0,
        Handler::new(HandlerKind::NewMessage, |_| -> Ready<_> { panic!("filtered out") })
            .filter(|u| matches!(u, Update::NewMessage(m) if m.text() == "other")),
    )
    .await;
    d.add_handler(
        0,
        Handler::new(HandlerKind::NewMessage, move |u| {
            let tx = Arc::clone(&tx);
            async move {
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(u);
                }
                Ok(())
            }
        }),
    )
    .await;

    d.dispatch(new_message(42, "hello")).await;
    match rx.await.unwrap() {
        Update::NewMessage(m) => {
            assert_eq!(m.id(), 42);
            assert_eq!(m.text(), "hello");
            match m.sender {
                Some(Peer::User(enums::User::User(u))) => assert_eq!(u.first_name.as_deref(), Some("Ada")),
                other => panic!("unexpected sender {other:?}"),
            }
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn registration_waits_for_the_running_pass() {
    let d = dispatcher();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let handler = {
        let (entered, release) = (Arc::clone(&entered), Arc::clone(&release));
        Handler::new(HandlerKind::Raw, move |_| {
            let (entered, release) = (Arc::clone(&entered), Arc::clone(&release));
            async move {
                entered.notify_one();
                release.notified().await;
                Ok(())
            }
        })
    };
    d.add_handler(0, handler).await;

    let pass = {
        let d = Arc::clone(&d);
        tokio::spawn(async move { d.dispatch(raw_update()).await })
    };
    entered.notified().await;

    let mut adding = {
        let d = Arc::clone(&d);
        tokio::spawn(async move { d.add_handler(0, Handler::new(HandlerKind::Raw, |_| async { Ok(()) })).await })
    };
    assert!(tokio::time::timeout(Duration::from_millis(50), &mut adding).await.is_err());

    release.notify_one();
    pass.await.unwrap();
    adding.await.unwrap();
    assert_eq!(d.handler_count().await, 2);
}

#[tokio::test]
async fn handlers_can_edit_the_registry_from_inside_a_pass() {
    let d = dispatcher();
    let log: Log = Arc::default();
    let added = Arc::new(Mutex::new(None));
    let handler = {
        let (d, log, added) = (Arc::clone(&d), Arc::clone(&log), Arc::clone(&added));
        Handler::new(HandlerKind::Raw, move |_| {
            let (d, log, added) = (Arc::clone(&d), Arc::clone(&log), Arc::clone(&added));
            async move {
                if added.lock().unwrap().is_none() {
                    let id = d.add_handler(1, logging(&log, "added", || Ok(()))).await;
                    *added.lock().unwrap() = Some(id);
                }
                Ok(())
            }
        })
    };
    d.add_handler(0, handler).await;

    // The new handler is not part of the pass that added it.
    tokio::time::timeout(Duration::from_secs(3), d.dispatch(raw_update())).await.expect("dispatch deadlocked");
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(d.handler_count().await, 2);

    tokio::time::timeout(Duration::from_secs(3), d.dispatch(raw_update())).await.expect("dispatch deadlocked");
    assert_eq!(*log.lock().unwrap(), ["added"]);

    // Removal from inside a handler reports the id as known.
    let id = added.lock().unwrap().expect("handler id");
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    let remover = {
        let d = Arc::clone(&d);
        Handler::new(HandlerKind::Raw, move |_| {
            let d = Arc::clone(&d);
            let tx = tx.lock().unwrap().take();
            async move {
                if let Some(tx) = tx {
                    let _ = tx.send(d.remove_handler(id).await);
                }
                Err(HandlerError::StopPropagation)
            }
        })
    };
    d.add_handler(-1, remover).await;
    tokio::time::timeout(Duration::from_secs(3), d.dispatch(raw_update())).await.expect("dispatch deadlocked");
    assert!(rx.await.unwrap());
    assert_eq!(d.handler_count().await, 2);
}

#[tokio::test]
async fn workers_drain_the_queue_before_stopping() {
    let d = dispatcher();
    let seen = Arc::new(Mutex::new(0usize));
    {
        let seen = Arc::clone(&seen);
        d.add_handler(
            0,
            Handler::new(HandlerKind::Raw, move |_| {
                let seen = Arc::clone(&seen);
                async move {
                    *seen.lock().unwrap() += 1;
                    Ok(())
                }
            }),
        )
        .await;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    d.start(rx, 4);
    for _ in 0..50 {
        tx.send(raw_update()).unwrap();
    }
    drop(tx);
    d.stop().await;
    assert_eq!(*seen.lock().unwrap(), 50);
}

#[tokio::test]
async fn edits_carry_the_previous_copy() {
    let d = dispatcher();
    let (tx, mut rx) = mpsc::unbounded_channel();
    d.add_handler(
        0,
        Handler::new(HandlerKind::MessageEdited, move |u| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(u);
                Ok(())
            }
        }),
    )
    .await;

    d.dispatch(new_message(5, "before")).await;
    let edited = types::Message {
        edit_date: Some(1),
        ..types::Message::new(5, types::PeerUser { user_id: 7 }.into(), 0, "after")
    };
    let update = types::UpdateEditMessage { message: edited.into(), pts: 2, pts_count: 1 }.into();
    d.dispatch(Envelope::bare(update)).await;

    match rx.recv().await {
        Some(Update::MessageEdited(m)) => {
            assert_eq!(m.text(), "after");
            assert!(matches!(m.previous, Some(enums::Message::Message(p)) if p.message == "before"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
