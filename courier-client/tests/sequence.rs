use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use courier_client::peers::channel_marked;
use courier_client::sequence::{DifferenceSource, Sequencer, SequencerConfig};
use courier_client::session::Push;
use courier_client::storage::{GLOBAL_SCOPE, UpdateState};
use courier_client::update::Envelope;
use courier_client::{InvocationError, MemoryStorage, PeerCache, Storage};
use courier_tl_types::{enums, functions, types};
use tokio::sync::mpsc;

/// Answers difference requests from a script and records what was asked for.
#[derive(Default)]
struct Script {
    asked:               Arc<Mutex<Vec<i32>>>,
    asked_channels:      Arc<Mutex<Vec<(enums::InputChannel, i32)>>>,
    state:               Option<types::updates::State>,
    differences:         Mutex<VecDeque<enums::updates::Difference>>,
    channel_differences: Mutex<VecDeque<enums::updates::ChannelDifference>>,
}

impl DifferenceSource for Script {
    async fn get_state(&self) -> Result<enums::updates::State, InvocationError> {
        Ok(self.state.clone().expect("unexpected getState").into())
    }

    async fn get_difference(
        &self,
        req: functions::updates::GetDifference,
    ) -> Result<enums::updates::Difference, InvocationError> {
        self.asked.lock().unwrap().push(req.pts);
        Ok(self.differences.lock().unwrap().pop_front().expect("unexpected getDifference"))
    }

    async fn get_channel_difference(
        &self,
        req: functions::updates::GetChannelDifference,
    ) -> Result<enums::updates::ChannelDifference, InvocationError> {
        self.asked_channels.lock().unwrap().push((req.channel, req.pts));
        Ok(self.channel_differences.lock().unwrap().pop_front().expect("unexpected getChannelDifference"))
    }
}

fn message(id: i32) -> enums::Message {
    types::Message {
        from_id: Some(types::PeerUser { user_id: 7 }.into()),
        ..types::Message::new(id, types::PeerUser { user_id: 7 }.into(), 1_700_000_000, format!("#{id}"))
    }
    .into()
}

const CHANNEL: i64 = 5;

fn channel_message(id: i32) -> enums::Message {
    types::Message::new(id, types::PeerChannel { channel_id: CHANNEL }.into(), 1_700_000_000, format!("#{id}")).into()
}

fn channel(min: bool, access_hash: Option<i64>) -> enums::Chat {
    types::Channel { id: CHANNEL, min, access_hash, title: "news".into(), broadcast: true, ..Default::default() }.into()
}

/// A channel update pushed in a full container that carries `chats`.
fn pushed_in_channel(id: i32, pts: i32, chats: Vec<enums::Chat>) -> Push {
    let update = types::UpdateNewChannelMessage { message: channel_message(id), pts, pts_count: 1 }.into();
    Push::Updates(types::Updates { updates: vec![update], users: Vec::new(), chats, date: 1_700_000_000, seq: 0 }.into())
}

fn pushed(id: i32, pts: i32) -> Push {
    let update = types::UpdateNewMessage { message: message(id), pts, pts_count: 1 }.into();
    Push::Updates(types::UpdateShort { update, date: 1_700_000_000 }.into())
}

fn state(pts: i32) -> types::updates::State {
    types::updates::State { pts, qts: 0, date: 1_700_000_100, seq: 0, unread_count: 0 }
}

fn sequencer(script: Script, storage: Arc<dyn Storage>, persist: bool) -> (Sequencer<Script>, mpsc::UnboundedReceiver<Envelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let peers = Arc::new(PeerCache::new(Arc::clone(&storage)));
    (Sequencer::new(script, peers, storage, SequencerConfig { is_bot: false, persist }, tx), rx)
}

fn message_ids(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Vec<i32> {
    let mut ids = Vec::new();
    while let Ok(env) = rx.try_recv() {
        match env.update {
            enums::Update::NewMessage(u) => ids.push(u.message.id()),
            enums::Update::NewChannelMessage(u) => ids.push(u.message.id()),
            other => panic!("unexpected {other:?}"),
        }
    }
    ids
}

#[tokio::test]
async fn gaps_are_filled_from_the_difference_in_order() {
    let script = Script::default();
    let asked = Arc::clone(&script.asked);
    script.differences.lock().unwrap().push_back(
        types::updates::Difference {
            new_messages:           vec![message(11), message(12)],
            new_encrypted_messages: Vec::new(),
            other_updates:          Vec::new(),
            chats:                  Vec::new(),
            users:                  Vec::new(),
            state:                  state(13).into(),
        }
        .into(),
    );
    let (mut seq, mut rx) = sequencer(script, Arc::new(MemoryStorage::new()), false);

    seq.handle(pushed(10, 10)).await;
    // pts 14 expects a local 13; 11..=13 were missed.
    seq.handle(pushed(14, 14)).await;

    assert_eq!(*asked.lock().unwrap(), [10]);
    assert_eq!(message_ids(&mut rx), [10, 11, 12, 14]);
    assert_eq!(seq.state(GLOBAL_SCOPE).map(|s| s.pts), Some(14));
}

#[tokio::test]
async fn duplicates_are_dropped_silently() {
    let (mut seq, mut rx) = sequencer(Script::default(), Arc::new(MemoryStorage::new()), false);

    seq.handle(pushed(1, 5)).await;
    seq.handle(pushed(2, 6)).await;
    seq.handle(pushed(2, 6)).await;
    seq.handle(pushed(1, 5)).await;

    assert_eq!(message_ids(&mut rx), [1, 2]);
    assert_eq!(seq.state(GLOBAL_SCOPE).map(|s| s.pts), Some(6));
}

#[tokio::test]
async fn too_long_without_state_adopts_the_server_baseline() {
    let script = Script { state: Some(state(500)), ..Default::default() };
    let asked = Arc::clone(&script.asked);
    let (mut seq, mut rx) = sequencer(script, Arc::new(MemoryStorage::new()), false);

    seq.handle(Push::Updates(types::UpdatesTooLong {}.into())).await;

    assert!(asked.lock().unwrap().is_empty());
    assert!(message_ids(&mut rx).is_empty());
    let global = seq.state(GLOBAL_SCOPE).unwrap();
    assert_eq!((global.pts, global.date), (500, 1_700_000_100));

    // The baseline is live: the next update in sequence applies directly.
    seq.handle(pushed(9, 501)).await;
    assert_eq!(message_ids(&mut rx), [9]);
}

#[tokio::test]
async fn persisted_state_is_caught_up_on_resume() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set_state(UpdateState { scope: GLOBAL_SCOPE, pts: 40, qts: 2, date: 1_600_000_000, seq: 3 }).unwrap();

    let script = Script::default();
    let asked = Arc::clone(&script.asked);
    {
        let mut differences = script.differences.lock().unwrap();
        differences.push_back(
            types::updates::DifferenceSlice {
                new_messages:           vec![message(41)],
                new_encrypted_messages: Vec::new(),
                other_updates:          Vec::new(),
                chats:                  Vec::new(),
                users:                  Vec::new(),
                intermediate_state:     state(41).into(),
            }
            .into(),
        );
        differences.push_back(types::updates::DifferenceEmpty { date: 1_700_000_200, seq: 4 }.into());
    }
    let (mut seq, mut rx) = sequencer(script, Arc::clone(&storage), true);

    seq.resume().await;

    assert_eq!(*asked.lock().unwrap(), [40, 41]);
    assert_eq!(message_ids(&mut rx), [41]);
    let saved = storage.state(GLOBAL_SCOPE).unwrap().unwrap();
    assert_eq!((saved.pts, saved.date, saved.seq), (41, 1_700_000_200, 4));
}

#[tokio::test]
async fn a_slice_that_does_not_advance_ends_recovery() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set_state(UpdateState { scope: GLOBAL_SCOPE, pts: 40, qts: 0, date: 1_600_000_000, seq: 0 }).unwrap();

    let script = Script::default();
    let asked = Arc::clone(&script.asked);
    // Only one answer is scripted; asking again would panic the source.
    script.differences.lock().unwrap().push_back(
        types::updates::DifferenceSlice {
            new_messages:           vec![message(41)],
            new_encrypted_messages: Vec::new(),
            other_updates:          Vec::new(),
            chats:                  Vec::new(),
            users:                  Vec::new(),
            intermediate_state:     state(40).into(),
        }
        .into(),
    );
    let (mut seq, mut rx) = sequencer(script, storage, true);

    tokio::time::timeout(std::time::Duration::from_secs(3), seq.resume()).await.expect("recovery must terminate");

    assert_eq!(*asked.lock().unwrap(), [40]);
    assert_eq!(message_ids(&mut rx), [41]);
    assert_eq!(seq.state(GLOBAL_SCOPE).map(|s| s.pts), Some(40));
}

#[tokio::test]
async fn a_non_final_channel_difference_that_does_not_advance_ends_recovery() {
    let script = Script::default();
    let asked = Arc::clone(&script.asked_channels);
    script.channel_differences.lock().unwrap().push_back(
        types::updates::ChannelDifference {
            r#final:       false,
            pts:           7,
            timeout:       None,
            new_messages:  vec![channel_message(8)],
            other_updates: Vec::new(),
            chats:         Vec::new(),
            users:         Vec::new(),
        }
        .into(),
    );
    let (mut seq, mut rx) = sequencer(script, Arc::new(MemoryStorage::new()), false);
    let scope = channel_marked(CHANNEL);

    // Baseline at pts 7 with the channel's access hash cached.
    seq.handle(pushed_in_channel(7, 7, vec![channel(false, Some(77))])).await;
    tokio::time::timeout(std::time::Duration::from_secs(3), seq.recover(scope))
        .await
        .expect("recovery must terminate");

    let input: enums::InputChannel = types::InputChannel { channel_id: CHANNEL, access_hash: 77 }.into();
    assert_eq!(*asked.lock().unwrap(), [(input, 7)]);
    assert_eq!(message_ids(&mut rx), [7, 8]);
    assert_eq!(seq.state(scope).map(|s| s.pts), Some(7));
}

#[tokio::test]
async fn channel_gaps_recover_with_the_access_hash_of_a_min_record() {
    let script = Script::default();
    let asked = Arc::clone(&script.asked_channels);
    script.channel_differences.lock().unwrap().push_back(
        types::updates::ChannelDifference {
            r#final:       true,
            pts:           12,
            timeout:       None,
            new_messages:  vec![channel_message(11), channel_message(12)],
            other_updates: Vec::new(),
            chats:         Vec::new(),
            users:         Vec::new(),
        }
        .into(),
    );
    let (mut seq, mut rx) = sequencer(script, Arc::new(MemoryStorage::new()), false);

    // `min` records never reach the peer cache.
    seq.handle(pushed_in_channel(10, 10, vec![channel(true, Some(99))])).await;
    seq.handle(pushed_in_channel(12, 12, vec![channel(true, Some(99))])).await;

    let input: enums::InputChannel = types::InputChannel { channel_id: CHANNEL, access_hash: 99 }.into();
    assert_eq!(*asked.lock().unwrap(), [(input, 10)]);
    // The pushed #12 arrived through the difference already.
    assert_eq!(message_ids(&mut rx), [10, 11, 12]);
    assert_eq!(seq.state(channel_marked(CHANNEL)).map(|s| s.pts), Some(12));
}

#[tokio::test]
async fn channel_gaps_without_any_access_hash_rebase_on_the_update() {
    let script = Script::default();
    let asked = Arc::clone(&script.asked_channels);
    let (mut seq, mut rx) = sequencer(script, Arc::new(MemoryStorage::new()), false);
    let scope = channel_marked(CHANNEL);

    seq.handle(pushed_in_channel(10, 10, Vec::new())).await;
    seq.handle(pushed_in_channel(20, 20, vec![channel(true, None)])).await;
    // The scope follows on from the new baseline.
    seq.handle(pushed_in_channel(21, 21, Vec::new())).await;

    assert!(asked.lock().unwrap().is_empty());
    assert_eq!(message_ids(&mut rx), [10, 20, 21]);
    assert_eq!(seq.state(scope).map(|s| s.pts), Some(21));
}
