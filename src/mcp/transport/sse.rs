use crate::mcp::error::McpError;
use reqwest::Url;

/// Accumulates raw byte chunks and yields complete lines, independent of
/// how the transport split the stream. Blank lines are significant frame
/// boundaries and are passed through.
#[derive(Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        self.drain_lines(false)
    }

    /// Drains any trailing line left when the stream ends without a final
    /// newline.
    pub fn finish(&mut self) -> Vec<String> {
        self.drain_lines(true)
    }

    fn drain_lines(&mut self, flush: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let mut search_index = 0;

        while let Some(relative_pos) = self.buffer[search_index..].iter().position(|b| *b == b'\n')
        {
            let newline_index = search_index + relative_pos;
            let mut line_end = newline_index;
            if line_end > search_index && self.buffer[line_end - 1] == b'\r' {
                line_end -= 1;
            }

            lines.push(String::from_utf8_lossy(&self.buffer[search_index..line_end]).into_owned());
            search_index = newline_index + 1;
        }

        if flush {
            if search_index < self.buffer.len() {
                lines.push(String::from_utf8_lossy(&self.buffer[search_index..]).into_owned());
            }
            self.buffer.clear();
        } else if search_index > 0 {
            self.buffer.drain(..search_index);
        }

        lines
    }
}

/// One parsed (event-type, payload) unit from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: String,
    pub data: String,
}

/// Turns a sequence of lines into frames.
///
/// An `event:` line sets the current frame's type; each `data:` line
/// appends its content (minus at most one leading space); any other
/// non-blank line continues an open data buffer; a blank line flushes the
/// frame with its data lines newline-joined.
#[derive(Default)]
pub struct FrameParser {
    event: Option<String>,
    data: Vec<String>,
}

impl FrameParser {
    pub fn push_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            let event = self.event.take();
            let data = std::mem::take(&mut self.data);
            return match event {
                Some(event) if !data.is_empty() => Some(Frame {
                    event,
                    data: data.join("\n"),
                }),
                _ => None,
            };
        }

        if let Some(event) = line.strip_prefix("event:") {
            self.event = Some(event.trim().to_string());
        } else if let Some(data) = line.strip_prefix("data:") {
            self.data
                .push(data.strip_prefix(' ').unwrap_or(data).to_string());
        } else if !self.data.is_empty() {
            self.data.push(line.to_string());
        }
        None
    }
}

/// Resolves an endpoint frame payload against the origin of the streaming
/// request: absolute URLs are used verbatim, paths are joined to the
/// origin, anything else is a protocol violation.
pub fn resolve_endpoint(origin: &Url, payload: &str) -> Result<Url, McpError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(McpError::Protocol(
            "endpoint event carried an empty payload".to_string(),
        ));
    }

    if payload.starts_with("http://") || payload.starts_with("https://") {
        return Url::parse(payload).map_err(|err| {
            McpError::Protocol(format!("invalid endpoint URL {payload:?}: {err}"))
        });
    }

    origin
        .join(payload)
        .map_err(|err| McpError::Protocol(format!("invalid endpoint path {payload:?}: {err}")))
}
