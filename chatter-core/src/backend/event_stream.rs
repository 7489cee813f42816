//! Incremental `text/event-stream` framing.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
}

impl ServerEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Feeds on raw body chunks, which may split lines (or UTF-8 sequences)
/// anywhere.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Bytes received but not yet terminated by a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn process_line(&mut self, line: &str) -> Option<ServerEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<ServerEvent> {
        let event = self.event.take();
        if event.is_none() && self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(ServerEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(b"event: put\ndata: {\"path\":\"/\",\"data\":null}\n\n");

        assert_eq!(
            events,
            vec![ServerEvent::new("put", r#"{"path":"/","data":null}"#)]
        );
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = EventStreamParser::new();

        assert!(parser.feed(b"event: pa").is_empty());
        assert!(parser.feed(b"tch\ndata: {\"path\":\"/a\",").is_empty());
        assert!(parser.feed(b"\"data\":{}}\n").is_empty());
        let events = parser.feed(b"\n");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "patch");
        assert_eq!(events[0].data, r#"{"path":"/a","data":{}}"#);
    }

    #[test]
    fn test_crlf_and_comments() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(b": hello\r\nevent: keep-alive\r\ndata: null\r\n\r\n");

        assert_eq!(events, vec![ServerEvent::new("keep-alive", "null")]);
    }

    #[test]
    fn test_multiple_events_one_chunk() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(
            b"event: keep-alive\ndata: null\n\nevent: cancel\ndata: permission denied\n\n",
        );

        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ServerEvent::new("cancel", "permission denied"));
    }

    #[test]
    fn test_multiline_data_joined() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed(b"data: one\ndata: two\n\n");

        assert_eq!(events, vec![ServerEvent::new("message", "one\ntwo")]);
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let mut parser = EventStreamParser::new();
        let bytes = "event: put\ndata: héllo\n\n".as_bytes();
        let split = bytes.iter().position(|&b| b == 0xC3).unwrap() + 1;

        assert!(parser.feed(&bytes[..split]).is_empty());
        let events = parser.feed(&bytes[split..]);
        assert_eq!(events, vec![ServerEvent::new("put", "héllo")]);
    }

    #[test]
    fn test_blank_lines_without_fields_dispatch_nothing() {
        let mut parser = EventStreamParser::new();
        assert!(parser.feed(b"\n\n\n").is_empty());
    }
}
