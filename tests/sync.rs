//! Integration tests for the file sync request reader.

use adbwire::{
    DecodeError, DecoderConfig, ProtocolViolation, RawTag, SendTarget, SendV2Request,
    SyncRequest, Tag, sync::Compression,
};
use adbwire_testing::{
    decoder_for, decoder_over_duplex, decoder_with_config, encode_command, encode_quit,
    encode_raw_sync, encode_send_v2, encode_sync,
};
use proptest::prelude::*;
use rstest::rstest;

#[tokio::test]
async fn send_then_recv_mismatch_names_both_tags() {
    let wire = encode_sync(Tag::Send, b"abc");
    let mut decoder = decoder_for(wire.clone());
    assert_eq!(decoder.receive_send().await.expect("send"), "abc");

    let mut decoder = decoder_for(wire);
    let err = decoder.receive_recv().await.expect_err("wrong tag");
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolViolation::UnexpectedTag {
            expected: Tag::Recv,
            found: RawTag(found),
        }) if &found == b"SEND"
    ));
}

#[rstest]
#[case(Tag::Stat)]
#[case(Tag::Lst2)]
#[case(Tag::List)]
#[case(Tag::Lis2)]
#[case(Tag::Send)]
#[case(Tag::Recv)]
#[case(Tag::Rcv2)]
#[tokio::test]
async fn typed_reads_accept_their_tag(#[case] tag: Tag) {
    let path = "/sdcard/DCIM/Camera";
    let mut decoder = decoder_for(encode_sync(tag, path.as_bytes()));
    let decoded = match tag {
        Tag::Stat => decoder.receive_stat().await,
        Tag::Lst2 => decoder.receive_stat_v2().await,
        Tag::List => decoder.receive_list().await,
        Tag::Lis2 => decoder.receive_list_v2().await,
        Tag::Send => decoder.receive_send().await,
        Tag::Recv => decoder.receive_recv().await,
        Tag::Rcv2 => decoder.receive_recv_v2().await,
        other => panic!("no typed read for {other}"),
    };
    assert_eq!(decoded.expect("path"), path);
}

#[rstest]
#[case(*b"stat")]
#[case(*b"STA2")]
#[case(*b"LIST")]
#[case(*b"\0\0\0\0")]
#[tokio::test]
async fn stat_rejects_other_tags(#[case] tag: [u8; 4]) {
    let mut decoder = decoder_for(encode_raw_sync(tag, b"/"));
    let err = decoder.receive_stat().await.expect_err("wrong tag");
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolViolation::UnexpectedTag {
            expected: Tag::Stat,
            ..
        })
    ));
}

#[tokio::test]
async fn stat_v2_does_not_accept_sta2() {
    let mut decoder = decoder_for(encode_sync(Tag::Sta2, b"/"));
    let err = decoder.receive_stat_v2().await.expect_err("STA2 is not LST2");
    assert_eq!(err.error_type(), "protocol");
}

#[tokio::test]
async fn send_v2_reads_both_sub_frames() {
    let mut wire = encode_send_v2("/data/local/tmp/app.apk", 0o100_644, SendV2Request::FLAG_ZSTD);
    wire.extend(encode_quit());
    let mut decoder = decoder_for(wire);

    let request = decoder.receive_send_v2().await.expect("send v2");
    assert_eq!(request.path, "/data/local/tmp/app.apk");
    assert_eq!(request.mode, 0o100_644);
    assert_eq!(request.compression(), Some(Compression::Zstd));
    assert!(!request.is_dry_run());
    decoder.receive_quit().await.expect("quit");
}

#[tokio::test]
async fn send_v2_rejects_wrong_second_tag() {
    let mut wire = encode_sync(Tag::Snd2, b"/x");
    wire.extend(b"SEND\x00\x00\x00\x00\x00\x00\x00\x00");
    let mut decoder = decoder_for(wire);
    let err = decoder.receive_send_v2().await.expect_err("bad handshake");
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolViolation::UnexpectedTag {
            expected: Tag::Snd2,
            ..
        })
    ));
}

#[tokio::test]
async fn send_v2_truncated_metadata_is_io_error() {
    let mut wire = encode_sync(Tag::Snd2, b"/x");
    wire.extend(b"SND2\x01\x00");
    let mut decoder = decoder_for(wire);
    let err = decoder.receive_send_v2().await.expect_err("truncated");
    assert!(err.is_unexpected_eof(), "got {err:?}");
}

#[tokio::test]
async fn legacy_send_payload_splits_into_target() {
    let mut decoder = decoder_for(encode_sync(Tag::Send, b"/sdcard/a.txt,33188"));
    let payload = decoder.receive_send().await.expect("send");
    let target = SendTarget::parse(&payload).expect("target");
    assert_eq!(target.path, "/sdcard/a.txt");
    assert_eq!(target.mode, 0o100_644);
}

#[rstest]
#[case(encode_sync(Tag::Stat, b"/a"), SyncRequest::Stat("/a".into()))]
#[case(
    encode_sync(Tag::Sta2, b"/b"),
    SyncRequest::StatV2 { path: "/b".into(), follow_symlinks: true }
)]
#[case(
    encode_sync(Tag::Lst2, b"/c"),
    SyncRequest::StatV2 { path: "/c".into(), follow_symlinks: false }
)]
#[case(encode_sync(Tag::List, b"/d"), SyncRequest::List("/d".into()))]
#[case(encode_sync(Tag::Lis2, b"/e"), SyncRequest::ListV2("/e".into()))]
#[case(encode_sync(Tag::Send, b"/f,420"), SyncRequest::Send("/f,420".into()))]
#[case(
    encode_send_v2("/g", 0o755, 0),
    SyncRequest::SendV2(SendV2Request { path: "/g".into(), mode: 0o755, flags: 0 })
)]
#[case(encode_sync(Tag::Recv, b"/h"), SyncRequest::Recv("/h".into()))]
#[case(encode_sync(Tag::Rcv2, b"/i"), SyncRequest::RecvV2("/i".into()))]
#[case(encode_quit(), SyncRequest::Quit)]
#[tokio::test]
async fn dispatches_on_request_tag(#[case] wire: Vec<u8>, #[case] expected: SyncRequest) {
    let len = wire.len() as u64;
    let mut decoder = decoder_for(wire);
    assert_eq!(decoder.receive_sync_request().await.expect("request"), expected);
    assert_eq!(decoder.source().consumed(), len);
}

#[rstest]
#[case(*b"DATA")]
#[case(*b"OKAY")]
#[case(*b"XYZW")]
#[tokio::test]
async fn dispatch_rejects_non_request_tags(#[case] tag: [u8; 4]) {
    let mut decoder = decoder_for(encode_raw_sync(tag, b""));
    let err = decoder.receive_sync_request().await.expect_err("not a request");
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolViolation::UnknownSyncTag { found }) if found == RawTag(tag)
    ));
}

#[tokio::test]
async fn generic_message_keeps_unknown_tag() {
    let mut decoder = decoder_for(encode_raw_sync(*b"ABCD", b"\x00\x01\x02"));
    let message = decoder.receive_sync_message().await.expect("message");
    assert_eq!(message.tag, RawTag(*b"ABCD"));
    assert_eq!(&message.payload[..], b"\x00\x01\x02");
}

#[tokio::test]
async fn full_push_session_over_partial_reads() {
    let mut wire = encode_command("sync:");
    wire.extend(encode_sync(Tag::Stat, b"/sdcard/x"));
    wire.extend(encode_send_v2("/sdcard/x", 0o644, SendV2Request::FLAG_DRY_RUN));
    wire.extend(encode_quit());
    let (mut decoder, writer) = decoder_over_duplex(wire, DecoderConfig::default(), 3);

    assert_eq!(decoder.receive_command().await.expect("command"), "sync:");
    assert_eq!(decoder.receive_stat().await.expect("stat"), "/sdcard/x");
    assert!(decoder.receive_send_v2().await.expect("send v2").is_dry_run());
    decoder.receive_quit().await.expect("quit");
    writer.await.expect("join").expect("write");
}

#[tokio::test]
async fn declared_length_past_end_is_io_error() {
    let mut decoder = decoder_for(b"STAT\x10\x00\x00\x00/short".to_vec());
    let err = decoder.receive_stat().await.expect_err("short");
    assert!(err.is_unexpected_eof(), "got {err:?}");
}

#[tokio::test]
async fn message_cap_applies_to_sync_payloads() {
    let config = DecoderConfig::default().with_max_message_length(8);
    let mut decoder = decoder_with_config(encode_sync(Tag::List, b"/sdcard/Download"), config);
    let err = decoder.receive_list().await.expect_err("oversized");
    assert!(matches!(
        err,
        DecodeError::OversizedMessage { length: 16, max: 8 }
    ));
}

proptest! {
    #[test]
    fn sync_message_round_trips(tag in any::<[u8; 4]>(), payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let mut decoder = decoder_for(encode_raw_sync(tag, &payload));
        let message = runtime.block_on(decoder.receive_sync_message());
        let message = message.expect("message");
        prop_assert_eq!(message.tag, RawTag(tag));
        prop_assert_eq!(&message.payload[..], &payload[..]);
    }

    #[test]
    fn stat_round_trips_text(path in "[ -~]{0,200}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let mut decoder = decoder_for(encode_sync(Tag::Stat, path.as_bytes()));
        let decoded = runtime.block_on(decoder.receive_stat());
        prop_assert_eq!(decoded.expect("stat"), path);
    }
}
