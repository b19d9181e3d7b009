//! Line-buffered decoding of upstream server-sent event bodies
//!
//! Network chunks do not line up with SSE events: one chunk may carry several
//! events and one event may be split across chunks (even mid UTF-8 sequence).

use futures::{Stream, StreamExt, stream};

use super::http_client::ByteStream;
use crate::domain::{DomainError, LlmStream, StreamChunk};

/// Accumulates raw bytes and yields the payload of every complete `data:` line
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning the `data:` payloads it completed
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
        }

        payloads
    }
}

/// Turn an upstream byte stream into a stream of `data:` payloads
pub fn data_lines(bytes: ByteStream) -> impl Stream<Item = Result<String, DomainError>> + Send {
    let mut decoder = SseDecoder::new();

    bytes.flat_map(move |result| {
        let items: Vec<Result<String, DomainError>> = match result {
            Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };

        stream::iter(items)
    })
}

/// Decode an upstream body into chunks; `parse` returns `None` for payloads to skip
pub fn parse_events<F>(bytes: ByteStream, mut parse: F) -> LlmStream
where
    F: FnMut(&str) -> Option<Result<StreamChunk, DomainError>> + Send + 'static,
{
    Box::pin(data_lines(bytes).filter_map(move |line| {
        let item = match line {
            Ok(data) => parse(&data),
            Err(e) => Some(Err(e)),
        };
        futures::future::ready(item)
    }))
}
