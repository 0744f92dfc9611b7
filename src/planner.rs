use std::fmt;

use memchr::memchr;

pub const NEWLINE: u8 = b'\n';

/// Half-open byte span `[start, end)` of the input owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Split `data` into `workers` line-aligned ranges.
///
/// Inputs too small to give every worker `min_chunk` bytes get a single
/// range. Every internal boundary lands right after a `\n`, so the
/// terminator stays with the earlier chunk. A line longer than the nominal
/// chunk size leaves the following ranges empty rather than splitting it.
pub fn plan(data: &[u8], workers: usize, min_chunk: usize) -> Vec<ChunkRange> {
    let len = data.len();
    if len == 0 {
        return vec![ChunkRange::new(0, 0)];
    }
    let mut workers = workers.max(1);
    if len / workers < min_chunk {
        workers = 1;
    }
    let chunk_size = len / workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0usize;
    for i in 0..workers {
        let end = if i == workers - 1 {
            len
        } else {
            let nominal = ((i + 1) * chunk_size).max(start);
            // Move forward to the next newline to keep lines intact
            match memchr(NEWLINE, &data[nominal..]) {
                Some(nl) => nominal + nl + 1,
                None => len,
            }
        };
        ranges.push(ChunkRange::new(start as u64, end as u64));
        start = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(data: &[u8], ranges: &[ChunkRange]) {
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(data.len() as u64));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap in {ranges:?}");
        }
        for r in &ranges[..ranges.len() - 1] {
            let end = r.end as usize;
            if end != 0 && end != data.len() {
                assert_eq!(data[end - 1], NEWLINE, "boundary {end} not after a terminator");
            }
        }
    }

    fn sample(lines: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..lines {
            out.extend_from_slice(format!("station-{};{}.{}\n", i % 7, i, i % 10).as_bytes());
        }
        out
    }

    #[test]
    fn ranges_partition_the_input() {
        let data = sample(200);
        for workers in 1..=16 {
            let ranges = plan(&data, workers, 1);
            assert_eq!(ranges.len(), workers);
            assert_partition(&data, &ranges);
        }
    }

    #[test]
    fn small_input_gets_one_range() {
        let data = sample(10);
        let ranges = plan(&data, 8, 8192);
        assert_eq!(ranges, vec![ChunkRange::new(0, data.len() as u64)]);
    }

    #[test]
    fn empty_input_gets_one_empty_range() {
        assert_eq!(plan(b"", 4, 1), vec![ChunkRange::new(0, 0)]);
        assert_eq!(plan(b"", 0, 0), vec![ChunkRange::new(0, 0)]);
        // no minimum chunk size must not fan an empty input out
        assert_eq!(plan(b"", 4, 0), vec![ChunkRange::new(0, 0)]);
    }

    #[test]
    fn zero_workers_means_one() {
        let data = sample(5);
        assert_eq!(plan(&data, 0, 1).len(), 1);
    }

    #[test]
    fn nominal_boundary_on_a_terminator() {
        // two workers, nominal boundary 5 lands on the first '\n'
        let data = b"abc;1\nd;22\n";
        let ranges = plan(data, 2, 1);
        assert_eq!(ranges, vec![ChunkRange::new(0, 6), ChunkRange::new(6, 11)]);
        assert_partition(data, &ranges);
    }

    #[test]
    fn nominal_boundary_right_after_a_terminator() {
        // nominal boundary 5 is the first byte of the second line
        let data = b"ab;1\ncd;2\n";
        let ranges = plan(data, 2, 1);
        assert_eq!(ranges, vec![ChunkRange::new(0, 10), ChunkRange::new(10, 10)]);
        assert_partition(data, &ranges);
    }

    #[test]
    fn long_line_leaves_later_ranges_empty() {
        let mut data = vec![b'x'; 100];
        data.extend_from_slice(b";1\nk;2\n");
        let ranges = plan(&data, 4, 1);
        assert_eq!(ranges.len(), 4);
        assert_partition(&data, &ranges);
        assert_eq!(ranges[0], ChunkRange::new(0, 103));
        assert_eq!(ranges[1], ChunkRange::new(103, 107));
        assert!(ranges[2].is_empty());
        assert!(ranges[3].is_empty());
    }

    #[test]
    fn missing_trailing_newline() {
        let data = b"a;1\nb;2\nc;3";
        let ranges = plan(data, 3, 1);
        assert_partition(data, &ranges);
        assert_eq!(ranges.last().map(|r| r.end), Some(data.len() as u64));
    }
}
