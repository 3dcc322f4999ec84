//! Integration tests for chunked file reception.

use std::io;

use adbwire::{DecodeError, DecoderConfig, ProtocolViolation, RawTag, SinkClose, Tag};
use adbwire_testing::{
    RecordingSink, decoder_for, decoder_over_duplex, decoder_with_config, encode_data,
    encode_done, encode_file, encode_quit, encode_raw_sync,
};
use rstest::{fixture, rstest};

#[fixture]
fn sink() -> RecordingSink { RecordingSink::default() }

#[rstest]
#[tokio::test]
async fn rebuilds_chunks_in_order(mut sink: RecordingSink) {
    let first = vec![b'a'; 100];
    let second = vec![b'b'; 50];
    let mut decoder = decoder_for(encode_file(&[&first, &second], 0));

    decoder.receive_file(&mut sink).await.expect("file");

    assert_eq!(sink.data.len(), 150);
    assert_eq!(&sink.data[..100], &first[..]);
    assert_eq!(&sink.data[100..], &second[..]);
    assert_eq!(sink.flushes, 2);
    assert_eq!(sink.shutdowns, 1);
}

#[rstest]
#[tokio::test]
async fn done_alone_yields_empty_file(mut sink: RecordingSink) {
    let mut decoder = decoder_for(encode_done(1_700_000_000));
    decoder.receive_file(&mut sink).await.expect("file");
    assert!(sink.data.is_empty());
    assert_eq!(sink.shutdowns, 1);
}

#[rstest]
#[tokio::test]
async fn zero_length_chunks_are_accepted(mut sink: RecordingSink) {
    let mut decoder = decoder_for(encode_file(&[b"", b"xyz", b""], 0));
    decoder.receive_file(&mut sink).await.expect("file");
    assert_eq!(sink.data, b"xyz");
}

#[rstest]
#[tokio::test]
async fn chunk_at_packet_limit_is_accepted(mut sink: RecordingSink) {
    let chunk = vec![7u8; adbwire::DEFAULT_MAX_PACKET_LENGTH];
    let mut decoder = decoder_for(encode_file(&[&chunk], 0));
    decoder.receive_file(&mut sink).await.expect("file");
    assert_eq!(sink.data.len(), adbwire::DEFAULT_MAX_PACKET_LENGTH);
}

#[rstest]
#[tokio::test]
async fn oversized_chunk_is_rejected_before_payload(mut sink: RecordingSink) {
    let config = DecoderConfig::default().with_max_packet_length(16);
    let mut wire = encode_data(&[0u8; 17]);
    let header_len = 8;
    wire.truncate(header_len);
    wire.extend(encode_quit());
    let mut decoder = decoder_with_config(wire, config);

    let err = decoder.receive_file(&mut sink).await.expect_err("oversized");
    assert!(matches!(
        err,
        DecodeError::UnsupportedProtocol { size: 17, max: 16 }
    ));
    assert_eq!(decoder.source().consumed(), header_len as u64);
    assert_eq!(sink.shutdowns, 1);
    decoder.receive_quit().await.expect("stream still aligned");
}

#[rstest]
#[case(*b"OKAY")]
#[case(*b"SEND")]
#[case(*b"data")]
#[tokio::test]
async fn unknown_chunk_tag_is_protocol_error(#[case] tag: [u8; 4], mut sink: RecordingSink) {
    let mut wire = encode_data(b"ok");
    wire.extend(encode_raw_sync(tag, b""));
    let mut decoder = decoder_for(wire);

    let err = decoder.receive_file(&mut sink).await.expect_err("bad tag");
    assert!(matches!(
        err,
        DecodeError::Protocol(ProtocolViolation::UnexpectedChunkTag { found }) if found == RawTag(tag)
    ));
    assert_eq!(sink.data, b"ok");
    assert_eq!(sink.shutdowns, 1);
}

#[rstest]
#[tokio::test]
async fn truncated_stream_still_closes_sink(mut sink: RecordingSink) {
    let mut wire = encode_data(b"whole");
    wire.extend(b"DATA\x0a\x00\x00\x00part");
    let mut decoder = decoder_for(wire);

    let err = decoder.receive_file(&mut sink).await.expect_err("truncated");
    assert!(err.is_unexpected_eof(), "got {err:?}");
    assert_eq!(sink.data, b"whole");
    assert_eq!(sink.shutdowns, 1);
}

#[tokio::test]
async fn failing_sink_surfaces_io_error() {
    let mut sink = RecordingSink::failing();
    let mut decoder = decoder_for(encode_file(&[b"abc"], 0));

    let err = decoder.receive_file(&mut sink).await.expect_err("write fails");
    assert!(matches!(&err, DecodeError::Io(e) if e.kind() == io::ErrorKind::Other));
    assert_eq!(sink.shutdowns, 1);
}

#[rstest]
#[tokio::test]
async fn legacy_close_accepts_single_chunk(mut sink: RecordingSink) {
    let config = DecoderConfig::default().with_sink_close(SinkClose::AfterFirstChunk);
    let mut decoder = decoder_with_config(encode_file(&[b"only"], 0), config);

    decoder.receive_file(&mut sink).await.expect("file");
    assert_eq!(sink.data, b"only");
    assert_eq!(sink.shutdowns, 1);
}

#[rstest]
#[tokio::test]
async fn legacy_close_rejects_second_chunk(mut sink: RecordingSink) {
    let config = DecoderConfig::default().with_sink_close(SinkClose::AfterFirstChunk);
    let mut decoder = decoder_with_config(encode_file(&[b"one", b"two"], 0), config);

    let err = decoder.receive_file(&mut sink).await.expect_err("closed sink");
    assert!(matches!(&err, DecodeError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert_eq!(sink.data, b"one");
    assert_eq!(sink.shutdowns, 1);
}

#[tokio::test]
async fn returns_owned_sink() {
    let mut decoder = decoder_for(encode_file(&[b"hello ", b"world"], 0));
    let sink = decoder.receive_file(Vec::new()).await.expect("file");
    assert_eq!(sink, b"hello world");
}

#[tokio::test]
async fn rebuilds_file_from_partial_reads() {
    let body: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
    let chunks: Vec<&[u8]> = body.chunks(1024).collect();
    let (mut decoder, writer) =
        decoder_over_duplex(encode_file(&chunks, 0), DecoderConfig::default(), 7);

    let sink = decoder.receive_file(Vec::new()).await.expect("file");
    assert_eq!(sink, body);
    writer.await.expect("join").expect("write");
}

#[test]
fn chunk_tags_are_data_and_done() {
    assert_eq!(&encode_data(b"")[..4], &Tag::Data.bytes());
    assert_eq!(&encode_done(0)[..4], &Tag::Done.bytes());
}

#[rstest]
#[case(encode_done(0), b"".as_slice())]
#[case(encode_file(&[b"small"], 0), b"small".as_slice())]
#[tokio::test]
async fn unbounded_packet_limit_does_not_preallocate(
    #[case] wire: Vec<u8>,
    #[case] expected: &[u8],
    mut sink: RecordingSink,
) {
    let config = DecoderConfig::default().with_max_packet_length(usize::MAX);
    let mut decoder = decoder_with_config(wire, config);

    decoder.receive_file(&mut sink).await.expect("file");
    assert_eq!(sink.data, expected);
    assert_eq!(sink.shutdowns, 1);
}
