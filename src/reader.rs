use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use memchr::{memchr, memrchr};
use tracing::trace;

use crate::planner::{ChunkRange, NEWLINE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Positioned,
    Buffered,
    Exhausted,
}

/// Sequential line reader over one [`ChunkRange`].
///
/// Each fetch reads at most `window` bytes and never past `range.end`, then
/// cuts the buffer back to its last `\n` so that a refill always starts on a
/// line boundary. A line that does not fit in the window grows the window
/// instead of being truncated.
pub struct ChunkReader<R> {
    inner: R,
    range: ChunkRange,
    /// Next byte to fetch.
    cursor: u64,
    window: usize,
    buf: Vec<u8>,
    /// File offset of `buf[0]`.
    origin: u64,
    /// Bytes of `buf` already handed out.
    pos: usize,
    line_offset: u64,
    state: State,
}

impl ChunkReader<File> {
    pub fn open(path: &Path, range: ChunkRange, window: usize) -> io::Result<Self> {
        Self::new(File::open(path)?, range, window)
    }
}

impl<R: Read + Seek> ChunkReader<R> {
    /// Position `inner` at `range.start`. Nothing is read until the first
    /// [`read_line`](Self::read_line).
    pub fn new(mut inner: R, range: ChunkRange, window: usize) -> io::Result<Self> {
        inner.seek(SeekFrom::Start(range.start))?;
        Ok(Self {
            inner,
            range,
            cursor: range.start,
            window: window.max(1),
            buf: Vec::new(),
            origin: range.start,
            pos: 0,
            line_offset: range.start,
            state: State::Positioned,
        })
    }

    /// Next line without its terminator, or `None` once the range is done.
    pub fn read_line(&mut self) -> io::Result<Option<&[u8]>> {
        loop {
            match self.state {
                State::Exhausted => return Ok(None),
                State::Positioned => self.fetch()?,
                State::Buffered if self.pos < self.buf.len() => {
                    let start = self.pos;
                    let (len, consumed) = match memchr(NEWLINE, &self.buf[start..]) {
                        Some(nl) => (nl, nl + 1),
                        // only the last line of the input can lack a terminator
                        None => (self.buf.len() - start, self.buf.len() - start),
                    };
                    self.pos += consumed;
                    self.line_offset = self.origin + start as u64;
                    return Ok(Some(&self.buf[start..start + len]));
                }
                State::Buffered if self.cursor < self.range.end => self.fetch()?,
                State::Buffered => self.state = State::Exhausted,
            }
        }
    }

    /// Absolute offset of the line most recently returned by `read_line`.
    pub fn line_offset(&self) -> u64 {
        self.line_offset
    }

    pub fn window(&self) -> usize {
        self.window
    }

    fn fetch(&mut self) -> io::Result<()> {
        self.buf.clear();
        self.pos = 0;
        self.origin = self.cursor;
        if self.cursor >= self.range.end {
            self.state = State::Exhausted;
            return Ok(());
        }

        let remaining = self.range.end - self.cursor;
        loop {
            let want = remaining.min(self.window as u64) as usize;
            self.buf.resize(want, 0);
            self.inner.seek(SeekFrom::Start(self.cursor))?;
            self.inner.read_exact(&mut self.buf)?;

            let usable = match memrchr(NEWLINE, &self.buf) {
                Some(nl) => nl + 1,
                None if want as u64 == remaining => want,
                None => {
                    self.window = self.window.saturating_mul(2);
                    trace!(
                        cursor = self.cursor,
                        window = self.window,
                        "line longer than read window, growing"
                    );
                    continue;
                }
            };
            self.buf.truncate(usable);
            self.cursor += usable as u64;
            self.state = State::Buffered;
            return Ok(());
        }
    }
}
