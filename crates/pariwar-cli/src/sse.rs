//! Incremental decoder for `text/event-stream` bodies.
//!
//! Network chunks can split a frame (or a UTF-8 sequence) anywhere, so bytes
//! are buffered until a blank line terminates the frame.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
  /// The `event:` field, if present.
  pub event: Option<String>,
  /// All `data:` lines joined with `\n`.
  pub data:  String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
  buf:     Vec<u8>,
  /// Bytes of `buf` already searched for a frame terminator.
  scanned: usize,
}

impl SseDecoder {
  /// Feed a chunk; returns every frame it completes.
  pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
    self
      .buf
      .extend(chunk.iter().copied().filter(|b| *b != b'\r'));

    let mut frames = Vec::new();
    loop {
      // Back up one byte: the terminator may straddle the previous chunk.
      let from = self.scanned.saturating_sub(1);
      let Some(offset) = self.buf[from..].windows(2).position(|w| w == b"\n\n") else {
        self.scanned = self.buf.len();
        break;
      };
      let end = from + offset;
      let raw: Vec<u8> = self.buf.drain(..end + 2).collect();
      self.scanned = 0;
      let text = String::from_utf8_lossy(&raw[..end]);
      if let Some(frame) = parse_frame(&text) {
        frames.push(frame);
      }
    }
    frames
  }
}

/// Parse one frame's lines; comment-only frames (keep-alives) yield `None`.
fn parse_frame(text: &str) -> Option<SseFrame> {
  let mut event = None;
  let mut data: Vec<&str> = Vec::new();

  for line in text.split('\n') {
    if line.is_empty() || line.starts_with(':') {
      continue;
    }
    let (field, value) = match line.split_once(':') {
      Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
      None => (line, ""),
    };
    match field {
      "event" => event = Some(value.to_owned()),
      "data" => data.push(value),
      _ => {}
    }
  }

  if event.is_none() && data.is_empty() {
    return None;
  }
  Some(SseFrame { event, data: data.join("\n") })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_a_complete_frame() {
    let mut d = SseDecoder::default();
    let frames = d.push(b"event: snapshot\ndata: {\"version\":1}\n\n");
    assert_eq!(frames, vec![SseFrame {
      event: Some("snapshot".into()),
      data:  "{\"version\":1}".into(),
    }]);
  }

  #[test]
  fn frames_split_across_chunks() {
    let mut d = SseDecoder::default();
    assert!(d.push(b"event: snap").is_empty());
    assert!(d.push(b"shot\ndata: a").is_empty());
    let frames = d.push(b"bc\n\nevent: error\ndata: x\n\n");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].data, "abc");
    assert_eq!(frames[1].event.as_deref(), Some("error"));
  }

  #[test]
  fn one_byte_at_a_time() {
    let stream = b"event: snapshot\ndata: {}\n\ndata: second\n\n";
    let mut d = SseDecoder::default();
    let frames: Vec<SseFrame> = stream.iter().flat_map(|b| d.push(&[*b])).collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].event.as_deref(), Some("snapshot"));
    assert_eq!(frames[1].data, "second");
    assert!(d.buf.is_empty());
  }

  #[test]
  fn multibyte_text_split_mid_character() {
    let payload = "data: राम\n\n".as_bytes();
    let mut d = SseDecoder::default();
    assert!(d.push(&payload[..8]).is_empty());
    let frames = d.push(&payload[8..]);
    assert_eq!(frames[0].data, "राम");
  }

  #[test]
  fn keep_alive_comments_are_skipped() {
    let mut d = SseDecoder::default();
    assert!(d.push(b":\n\n: ping\n\n").is_empty());
  }

  #[test]
  fn crlf_and_multiline_data() {
    let mut d = SseDecoder::default();
    let frames = d.push(b"data: one\r\ndata:two\r\n\r\n");
    assert_eq!(frames[0].event, None);
    assert_eq!(frames[0].data, "one\ntwo");
  }
}
