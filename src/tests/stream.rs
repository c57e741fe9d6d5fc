use std::collections::HashSet;

use crate::{CancelToken, Hamt32, Hamt64, TransientHamt64};

fn numbers(n: u32) -> Hamt64<u32, String> {
    (0..n).map(|i| (i, i.to_string())).collect()
}

#[test]
fn stream_yields_every_pair() {
    let map = numbers(2000);
    let seen: HashSet<u32> = map
        .stream(16, CancelToken::new())
        .map(|(k, v)| {
            assert_eq!(v, k.to_string());
            k
        })
        .collect();
    assert_eq!(seen.len(), 2000);
}

#[test]
fn stream_matches_iter_order() {
    let map = numbers(500);
    let pulled: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
    let pushed: Vec<u32> = map.stream(1, CancelToken::new()).map(|(k, _)| k).collect();
    assert_eq!(pulled, pushed);
}

#[test]
fn zero_buffer_still_streams() {
    let map = numbers(10);
    assert_eq!(map.stream(0, CancelToken::new()).count(), 10);
}

#[test]
fn empty_map_stream_ends() {
    let map: Hamt32<u8, u8> = Hamt32::new();
    let mut stream = map.stream(4, CancelToken::new());
    assert_eq!(stream.next(), None);
    assert_eq!(stream.next(), None);
}

#[test]
fn cancel_stops_stream() {
    let map = numbers(10_000);
    let token = CancelToken::new();
    let mut stream = map.stream(4, token.clone());
    for _ in 0..3 {
        assert!(stream.next().is_some());
    }
    token.cancel();
    assert!(token.is_cancelled());
    assert_eq!(stream.next(), None);
    assert_eq!(stream.next(), None);
}

#[test]
fn cancel_through_stream_handle() {
    let map = numbers(10_000);
    let mut stream = map.stream(2, CancelToken::new());
    assert!(stream.next().is_some());
    stream.cancel();
    assert_eq!(stream.next(), None);
}

#[test]
fn pre_cancelled_token_yields_nothing() {
    let token = CancelToken::new();
    token.cancel();
    let map = numbers(100);
    assert_eq!(map.stream(8, token).count(), 0);
}

#[test]
fn one_token_stops_many_streams() {
    let map = numbers(5000);
    let token = CancelToken::new();
    let mut streams: Vec<_> = (0..4).map(|_| map.stream(1, token.clone())).collect();
    for stream in &mut streams {
        assert!(stream.next().is_some());
    }
    token.cancel();
    for stream in &mut streams {
        assert_eq!(stream.next(), None);
    }
}

/// Dropping a stream with a blocked producer must not hang.
#[test]
fn drop_mid_stream_joins_producer() {
    let map = numbers(10_000);
    let mut stream = map.stream(1, CancelToken::new());
    assert!(stream.next().is_some());
    drop(stream);
    let untouched = map.stream(1, CancelToken::new());
    drop(untouched);
}

/// The stream reads a snapshot; edits made afterwards are invisible to it.
#[test]
fn transient_edits_do_not_reach_stream() {
    let mut map: TransientHamt64<u32, u32> = (0..1000).map(|i| (i, i)).collect();
    let stream = map.stream(8, CancelToken::new());
    for i in 0..1000 {
        map.del(&i);
    }
    map.put(5000, 5000);
    let seen: HashSet<u32> = stream.map(|(k, _)| k).collect();
    assert_eq!(seen, (0..1000).collect::<HashSet<u32>>());
    assert_eq!(map.len(), 1);
}

#[test]
fn stream_outlives_map() {
    let stream = {
        let map = numbers(100);
        map.stream(4, CancelToken::new())
    };
    assert_eq!(stream.count(), 100);
}
