//! Event-stream framing shared by both providers.
//!
//! The transport hands over raw byte chunks with no alignment to lines, so
//! a `data:` frame (or even a multi-byte character) may be split across
//! any number of chunks. [`FrameDecoder`] buffers bytes, cuts complete
//! lines and keeps the unterminated tail for the next chunk.
//! [`fragment_stream`] turns a chunk stream into the text fragments the
//! session consumes, using a per-provider function to pull the delta text
//! out of each decoded frame.

use std::collections::VecDeque;
use std::fmt::Display;

use futures_util::{stream, Stream, StreamExt};
use tracing::debug;

use crate::{AiError, FragmentStream};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Pulls the text delta out of one decoded frame.
///
/// `Ok(None)` means the frame carried no text (role headers, usage, keep
/// alives). An `Err` ends the sequence.
pub(crate) type DeltaParser = fn(&serde_json::Value) -> Result<Option<String>, AiError>;

/// One complete `data:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Payload after the `data: ` prefix.
    Data(String),
    /// The `[DONE]` sentinel.
    Done,
}

/// Incremental line splitter for event-stream bodies.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to contain no newline.
    scanned: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every frame it completed.
    ///
    /// Lines that do not start with `data: ` (comments, `event:` fields,
    /// blank separators) produce nothing.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        let mut cursor = self.scanned;
        while let Some(offset) = self.buffer[cursor..].iter().position(|&b| b == b'\n') {
            let end = cursor + offset;
            if let Some(frame) = parse_line(&self.buffer[start..end]) {
                frames.push(frame);
            }
            start = end + 1;
            cursor = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        frames
    }

    /// Flush a final line the body ended without a newline.
    pub fn finish(&mut self) -> Option<Frame> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        parse_line(&rest)
    }

    /// Bytes held back waiting for the end of their line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(line: &[u8]) -> Option<Frame> {
    let line = String::from_utf8_lossy(line);
    let payload = line.trim().strip_prefix(DATA_PREFIX)?;
    if payload == DONE_SENTINEL {
        Some(Frame::Done)
    } else {
        Some(Frame::Data(payload.to_string()))
    }
}

/// Decode one frame payload into its text delta.
///
/// Undecodable JSON becomes [`AiError::MalformedFrame`]; empty deltas
/// become `None`.
pub(crate) fn decode_frame(payload: &str, parse: DeltaParser) -> Result<Option<String>, AiError> {
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| AiError::MalformedFrame(e.to_string()))?;
    Ok(parse(&value)?.filter(|text| !text.is_empty()))
}

struct StreamState<S> {
    body: std::pin::Pin<Box<S>>,
    decoder: FrameDecoder,
    parse: DeltaParser,
    pending: VecDeque<String>,
    failure: Option<AiError>,
    finished: bool,
}

impl<S> StreamState<S> {
    /// Queue the deltas of `frames`; stops at the sentinel or a fatal frame.
    fn absorb(&mut self, frames: impl IntoIterator<Item = Frame>) {
        for frame in frames {
            match frame {
                Frame::Done => {
                    self.finished = true;
                    return;
                }
                Frame::Data(payload) => match decode_frame(&payload, self.parse) {
                    Ok(Some(text)) => self.pending.push_back(text),
                    Ok(None) => {}
                    Err(e) if !e.is_fatal() => {
                        debug!(error = %e, "Skipping undecodable stream frame");
                    }
                    Err(e) => {
                        self.failure = Some(e);
                        self.finished = true;
                        return;
                    }
                },
            }
        }
    }
}

/// Turn a raw chunk stream into a fragment stream.
///
/// Fragments decoded before a fatal frame are still yielded, then the
/// error, then nothing. The `[DONE]` sentinel ends the sequence without
/// polling the body again.
pub(crate) fn fragment_stream<S, B, E>(body: S, parse: DeltaParser) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = StreamState {
        body: Box::pin(body),
        decoder: FrameDecoder::new(),
        parse,
        pending: VecDeque::new(),
        failure: None,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if let Some(error) = state.failure.take() {
                return Some((Err(error), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let frames = state.decoder.push(chunk.as_ref());
                    state.absorb(frames);
                }
                Some(Err(e)) => {
                    state.failure = Some(AiError::Transport(e.to_string()));
                    state.finished = true;
                }
                None => {
                    let tail = state.decoder.finish();
                    state.finished = true;
                    state.absorb(tail);
                }
            }
        }
    })
    .boxed()
}
