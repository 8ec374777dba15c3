use crate::error::{Bm25Error, Result};
use std::ops::Range;

/// Split `line_count` lines into `threads` contiguous ranges.
///
/// Every range holds `line_count / threads` lines and the last one absorbs the
/// remainder, so ranges tile `0..line_count` exactly. Ranges are empty when
/// there are more threads than lines.
pub fn partition_lines(line_count: usize, threads: usize) -> Result<Vec<Range<usize>>> {
    if threads == 0 {
        return Err(Bm25Error::InvalidThreadCount);
    }
    let chunk = line_count / threads;
    let ranges = (0..threads)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == threads { line_count } else { start + chunk };
            start..end
        })
        .collect();
    Ok(ranges)
}
