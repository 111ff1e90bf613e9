use async_stream::stream;
use futures::{Stream, StreamExt};
use geniesite_protocol::{FrameBuffer, ProtocolEvent};

/// One reassembled frame: a decoded event, or a frame that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub enum ReassembledFrame {
    Event(ProtocolEvent),
    /// Isolated decode failure; the sequence continues after it.
    Malformed { payload: String, error: String },
}

/// Decode the payload of one frame.
pub fn decode_frame(payload: String) -> ReassembledFrame {
    match serde_json::from_str::<ProtocolEvent>(&payload) {
        Ok(event) => ReassembledFrame::Event(event),
        Err(e) => {
            log::warn!("Malformed frame skipped: {} ({})", e, payload);
            ReassembledFrame::Malformed {
                payload,
                error: e.to_string(),
            }
        }
    }
}

/// Rebuild protocol events from byte chunks split at arbitrary boundaries.
///
/// Frames are yielded in emission order. A transport error is passed
/// through and ends the sequence. When the source ends, any unterminated
/// remainder gets one last decoding attempt.
pub fn reassemble<S, B, E>(source: S) -> impl Stream<Item = Result<ReassembledFrame, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    stream! {
        let mut frames = FrameBuffer::new();
        futures::pin_mut!(source);

        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(chunk) => {
                    for payload in frames.push(chunk.as_ref()) {
                        yield Ok(decode_frame(payload));
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(payload) = frames.finish() {
            log::debug!("Decoding unterminated final frame");
            yield Ok(decode_frame(payload));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use geniesite_protocol::encode_event;
    use pretty_assertions::assert_eq;
    use std::convert::Infallible;

    fn progress(value: f32) -> ProtocolEvent {
        ProtocolEvent::Progress {
            message: "Generating code...".to_string(),
            progress: value,
        }
    }

    async fn run(chunks: Vec<Vec<u8>>) -> Vec<ReassembledFrame> {
        let source = stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));
        reassemble(source)
            .map(|item| match item {
                Ok(frame) => frame,
                Err(never) => match never {},
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_split_at_every_byte_matches_unsplit() {
        let event = ProtocolEvent::Thoughts {
            content: "Sketching the héro section ✨ ".to_string(),
        };
        let frame = encode_event(&event).into_bytes();
        let unsplit = run(vec![frame.clone()]).await;
        assert_eq!(unsplit, vec![ReassembledFrame::Event(event)]);

        for split in 0..=frame.len() {
            let (a, b) = frame.split_at(split);
            let frames = run(vec![a.to_vec(), b.to_vec()]).await;
            assert_eq!(frames, unsplit, "split at byte {}", split);
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_is_isolated() {
        let mut bytes = encode_event(&progress(2.0)).into_bytes();
        bytes.extend_from_slice(b"data: {\"type\":\"progress\",\"message\":\n\n");
        bytes.extend_from_slice(encode_event(&progress(4.0)).as_bytes());

        let frames = run(vec![bytes]).await;
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], ReassembledFrame::Event(progress(2.0)));
        assert!(matches!(frames[1], ReassembledFrame::Malformed { .. }));
        assert_eq!(frames[2], ReassembledFrame::Event(progress(4.0)));
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_malformed() {
        let frames = run(vec![b"data: {\"type\":\"mystery\"}\n\n".to_vec()]).await;
        match &frames[..] {
            [ReassembledFrame::Malformed { payload, .. }] => {
                assert_eq!(payload, "{\"type\":\"mystery\"}");
            }
            other => panic!("unexpected frames {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_final_frame_without_terminator_is_recovered() {
        let complete = ProtocolEvent::Complete {
            code: "<!DOCTYPE html><html></html>".to_string(),
            thoughts: "done".to_string(),
        };
        let mut bytes = encode_event(&progress(10.0)).into_bytes();
        bytes.extend_from_slice(encode_event(&complete).trim_end().as_bytes());

        let frames = run(vec![bytes]).await;
        assert_eq!(
            frames,
            vec![
                ReassembledFrame::Event(progress(10.0)),
                ReassembledFrame::Event(complete),
            ]
        );
    }

    #[tokio::test]
    async fn test_many_frames_in_tiny_chunks_keep_order() {
        let events: Vec<ProtocolEvent> = (1..=20).map(|i| progress(i as f32)).collect();
        let bytes: Vec<u8> = events.iter().flat_map(|e| encode_event(e).into_bytes()).collect();
        let chunks: Vec<Vec<u8>> = bytes.chunks(3).map(|c| c.to_vec()).collect();

        let frames = run(chunks).await;
        let expected: Vec<ReassembledFrame> =
            events.into_iter().map(ReassembledFrame::Event).collect();
        assert_eq!(frames, expected);
    }

    #[tokio::test]
    async fn test_transport_error_ends_sequence() {
        let source = stream::iter(vec![
            Ok(encode_event(&progress(2.0)).into_bytes()),
            Err("connection reset"),
            Ok(encode_event(&progress(4.0)).into_bytes()),
        ]);

        let items: Vec<Result<ReassembledFrame, &str>> = reassemble(source).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok(ReassembledFrame::Event(progress(2.0))));
        assert_eq!(items[1], Err("connection reset"));
    }
}
