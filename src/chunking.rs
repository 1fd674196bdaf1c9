//! Fixed-size chunking used by object ingest.
//!
//! Ingest reads the whole request body before chunking, so this just slices
//! an in-memory buffer rather than splitting an incremental byte stream.

/// Splits `data` into chunks of `chunk_size` bytes, the last one possibly
/// shorter. An empty `data` yields no chunks at all.
pub fn iter_chunks(data: &[u8], chunk_size: usize) -> impl Iterator<Item = &[u8]> {
    assert!(chunk_size > 0, "chunk_size must be > 0");
    data.chunks(chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_fixed_chunks_with_short_tail() {
        let data = b"hello world";
        let chunks: Vec<&[u8]> = iter_chunks(data, 5).collect();
        assert_eq!(chunks, vec![&b"hello"[..], &b" worl"[..], &b"d"[..]]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks: Vec<&[u8]> = iter_chunks(b"", 5).collect();
        assert!(chunks.is_empty());
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let data = b"abcdefgh";
        let chunks: Vec<&[u8]> = iter_chunks(data, 4).collect();
        assert_eq!(chunks, vec![&b"abcd"[..], &b"efgh"[..]]);
    }
}
