/// Splits raw body bytes into newline-terminated lines.
///
/// Bytes are buffered across `push_chunk` calls, so one chunk may complete
/// zero, one or several lines. Only the trailing `\n` is removed; whitespace
/// handling belongs to the classifier.
#[derive(Debug, Default)]
pub(crate) struct LineFramer {
    buf: Vec<u8>,
    // Prefix of `buf` already known to hold no `\n`.
    scanned: usize,
}

impl LineFramer {
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete line, if one is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|b| *b == b'\n') else {
            self.scanned = self.buf.len();
            return None;
        };
        let idx = self.scanned + offset;
        let line = String::from_utf8_lossy(&self.buf[..idx]).into_owned();
        self.buf.drain(..=idx);
        self.scanned = 0;
        Some(line)
    }

    /// Flushes an unterminated final line once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    /// Bytes buffered for the current, not yet terminated line.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}
