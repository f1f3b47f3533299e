//! TCP-style delivery through `FramedRead` and the frame codec.

use futures::StreamExt;
use takshark_dissect::{CodecError, Dissector, Format, TakFrameCodec, Transport};
use tokio_util::codec::FramedRead;

fn stream_frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0xBF];
    takshark_wire::put_varint(&mut buf, payload.len() as u64);
    buf.extend_from_slice(payload);
    buf
}

fn cot_payload(uid: &str) -> Vec<u8> {
    let mut event = vec![0x2A, uid.len() as u8];
    event.extend_from_slice(uid.as_bytes());
    let mut payload = vec![0x12, event.len() as u8];
    payload.extend_from_slice(&event);
    payload
}

#[tokio::test]
async fn test_frames_split_across_reads() {
    let first = stream_frame(&cot_payload("uid-1"));
    let second = stream_frame(&cot_payload("uid-2"));
    let mut joined = first.clone();
    joined.extend_from_slice(&second);

    // Three reads that cut both frames in the middle
    let reader = tokio_test::io::Builder::new()
        .read(&joined[..3])
        .read(&joined[3..first.len() + 4])
        .read(&joined[first.len() + 4..])
        .build();
    let mut frames = FramedRead::new(reader, TakFrameCodec::default());

    let dissector = Dissector::default();
    let mut uids = Vec::new();
    while let Some(frame) = frames.next().await {
        let frame = frame.unwrap();
        let outcome = dissector.dissect(&frame, Transport::Stream);
        assert_eq!(outcome.format(), Some(Format::TakStream));
        assert_eq!(outcome.consumed(), Some(frame.len()));
        if let Some(takshark_dissect::Record::Tak(message)) = outcome.record() {
            uids.push(message.cot_event.as_ref().unwrap().uid.clone().unwrap());
        }
    }
    assert_eq!(uids, vec!["uid-1", "uid-2"]);
}

#[tokio::test]
async fn test_mixed_xml_and_tak_frames() {
    let xml = br#"<event version="2.0" uid="X-1" type="a-f-G"><point lat="1" lon="2"/></event>"#;
    let mut joined = xml.to_vec();
    joined.extend_from_slice(&stream_frame(&cot_payload("T-1")));

    let reader = tokio_test::io::Builder::new()
        .read(&joined[..20])
        .read(&joined[20..])
        .build();
    let frames: Vec<_> = FramedRead::new(reader, TakFrameCodec::default())
        .collect()
        .await;

    assert_eq!(frames.len(), 2);
    let dissector = Dissector::default();
    let formats: Vec<_> = frames
        .iter()
        .map(|frame| {
            let frame = frame.as_ref().unwrap();
            dissector.dissect(frame, Transport::Stream).format()
        })
        .collect();
    assert_eq!(formats, vec![Some(Format::Xml), Some(Format::TakStream)]);
}

#[tokio::test]
async fn test_peer_closing_mid_frame() {
    let frame = stream_frame(&cot_payload("uid-9"));
    let reader = tokio_test::io::Builder::new()
        .read(&frame[..frame.len() - 2])
        .build();
    let frames: Vec<_> = FramedRead::new(reader, TakFrameCodec::default())
        .collect()
        .await;

    assert_eq!(frames.len(), 1);
    let partial = frames[0].as_ref().unwrap();
    let outcome = Dissector::default().dissect(partial, Transport::Datagram);
    assert!(matches!(
        outcome,
        takshark_dissect::Dissection::Malformed {
            format: Some(Format::TakStream),
            ..
        }
    ));
}

#[tokio::test]
async fn test_oversized_frame_ends_stream() {
    let mut header = vec![0xBF];
    takshark_wire::put_varint(&mut header, 1 << 20);
    let reader = tokio_test::io::Builder::new().read(&header).build();
    let mut frames = FramedRead::new(reader, TakFrameCodec::new(1024));

    match frames.next().await {
        Some(Err(CodecError::FrameTooLarge { max: 1024, .. })) => {}
        other => panic!("unexpected {other:?}"),
    }
}
