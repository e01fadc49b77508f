use std::io::{self, Read};

/// Upper bound on one chunk: 32 MiB.
pub const MAXBLOB: usize = 32 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkParams {
    pub max_blob: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self { max_blob: MAXBLOB }
    }
}

impl ChunkParams {
    /// Number of chunks a file of `size` bytes splits into; zero for empty files.
    pub fn part_count(&self, size: u64) -> usize {
        size.div_ceil(self.max_blob as u64) as usize
    }

    /// Expected length of chunk `part` for a file of `size` bytes.
    pub fn part_len(&self, size: u64, part: usize) -> usize {
        let start = part as u64 * self.max_blob as u64;
        size.saturating_sub(start).min(self.max_blob as u64) as usize
    }
}

/// Fill `buf` with the next window of at most `max` bytes. Short only at EOF.
pub fn read_window<R: Read>(r: &mut R, max: usize, buf: &mut Vec<u8>) -> io::Result<usize> {
    buf.clear();
    r.by_ref().take(max as u64).read_to_end(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most 3 bytes per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.0.len().min(out.len()).min(3);
            out[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn window_is_full_despite_short_reads() {
        let data: Vec<u8> = (0..20).collect();
        let mut r = Trickle(&data);
        let mut buf = Vec::new();
        assert_eq!(read_window(&mut r, 8, &mut buf).unwrap(), 8);
        assert_eq!(buf, (0..8).collect::<Vec<u8>>());
        assert_eq!(read_window(&mut r, 8, &mut buf).unwrap(), 8);
        assert_eq!(read_window(&mut r, 8, &mut buf).unwrap(), 4);
        assert_eq!(read_window(&mut r, 8, &mut buf).unwrap(), 0);
    }

    #[test]
    fn part_math() {
        let p = ChunkParams { max_blob: 10 };
        assert_eq!(p.part_count(0), 0);
        assert_eq!(p.part_count(1), 1);
        assert_eq!(p.part_count(10), 1);
        assert_eq!(p.part_count(11), 2);
        assert_eq!(p.part_len(25, 0), 10);
        assert_eq!(p.part_len(25, 2), 5);
        assert_eq!(p.part_len(20, 1), 10);
    }
}
