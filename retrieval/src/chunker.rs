//! Corpus chunking.
//!
//! A corpus document is a sequence of *blocks* separated by blank lines.
//! Chunks are runs of `blocks_per_chunk` consecutive blocks joined with
//! [`BLOCK_SEPARATOR`]. Chunking is a pure function of the document and the
//! block count, so repeated runs produce identical chunk sequences.

use std::path::Path;

use crate::error::{Result, RetrievalError};

/// Separator placed between blocks inside a chunk.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Default number of blocks per chunk.
pub const DEFAULT_BLOCKS_PER_CHUNK: usize = 4;

/// Split a document into trimmed, non-empty blocks.
///
/// A block ends at any line that is empty or whitespace-only, so a block
/// never contains a blank line and joining with [`BLOCK_SEPARATOR`] can be
/// undone exactly.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_block(&mut lines, &mut blocks);
        } else {
            lines.push(line);
        }
    }
    flush_block(&mut lines, &mut blocks);

    blocks
}

fn flush_block(lines: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let block = lines.join("\n");
    lines.clear();

    let block = block.trim();
    if !block.is_empty() {
        blocks.push(block.to_string());
    }
}

/// Group blocks into chunks of `blocks_per_chunk`; the last chunk may be shorter.
pub fn chunk_blocks(blocks: &[String], blocks_per_chunk: usize) -> Vec<String> {
    blocks
        .chunks(blocks_per_chunk.max(1))
        .map(|group| group.join(BLOCK_SEPARATOR))
        .collect()
}

/// A chunked document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedCorpus {
    /// Non-empty blocks found in the document.
    pub blocks: usize,

    /// Chunks in document order.
    pub chunks: Vec<String>,
}

/// Splits corpus documents into retrieval chunks.
#[derive(Debug, Clone, Copy)]
pub struct CorpusChunker {
    blocks_per_chunk: usize,
}

impl CorpusChunker {
    /// Create a chunker grouping `blocks_per_chunk` blocks per chunk.
    pub fn new(blocks_per_chunk: usize) -> Self {
        Self {
            blocks_per_chunk: blocks_per_chunk.max(1),
        }
    }

    /// Blocks grouped into each chunk.
    pub fn blocks_per_chunk(&self) -> usize {
        self.blocks_per_chunk
    }

    /// Chunk text content.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.split(text).chunks
    }

    /// Chunk text content, keeping the block count.
    pub fn split(&self, text: &str) -> ChunkedCorpus {
        let blocks = split_blocks(text);
        ChunkedCorpus {
            blocks: blocks.len(),
            chunks: chunk_blocks(&blocks, self.blocks_per_chunk),
        }
    }

    /// Chunk a UTF-8 document from disk.
    pub async fn chunk_file(&self, path: &Path) -> Result<ChunkedCorpus> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            RetrievalError::Storage(format!("failed to read corpus {}: {e}", path.display()))
        })?;
        Ok(self.split(&text))
    }
}

impl Default for CorpusChunker {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKS_PER_CHUNK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "First block.\n\n  Second block\nspans two lines.  \n\n\n\nThird.\n \t \nFourth.\n\nFifth.\n";

    #[test]
    fn test_split_blocks_trims_and_drops_empty() {
        assert_eq!(
            split_blocks(DOC),
            vec![
                "First block.",
                "Second block\nspans two lines.",
                "Third.",
                "Fourth.",
                "Fifth."
            ]
        );
    }

    #[test]
    fn test_chunk_groups_blocks() {
        let chunks = CorpusChunker::new(2).chunk(DOC);
        assert_eq!(
            chunks,
            vec![
                "First block.\n\nSecond block\nspans two lines.",
                "Third.\n\nFourth.",
                "Fifth."
            ]
        );
    }

    #[test]
    fn test_default_groups_four_blocks() {
        let chunks = CorpusChunker::default().chunk(DOC);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "Fifth.");
    }

    #[test]
    fn test_empty_and_whitespace_documents() {
        assert!(CorpusChunker::default().chunk("").is_empty());
        assert!(CorpusChunker::default().chunk(" \n\n\t\n  ").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let chunks = CorpusChunker::new(1).chunk("one\r\n\r\ntwo\r\nmore\r\n");
        assert_eq!(chunks, vec!["one", "two\nmore"]);
    }

    #[test]
    fn test_chunks_reconstruct_block_sequence() {
        let documents = [
            DOC,
            "",
            "single",
            "a\n\nb\n\nc\n\nd\n\ne\n\nf\n\ng\n\nh\n\ni",
            "\n\n  lead\n\ntrail  \n\n\n",
            "x\n   \ny\n\n\n\n\nz\n\tindented\n\nw",
        ];

        for document in documents {
            let blocks = split_blocks(document);
            for n in 1..=6 {
                let chunks = chunk_blocks(&blocks, n);
                assert_eq!(chunks.len(), blocks.len().div_ceil(n));

                let rebuilt: Vec<String> = chunks
                    .iter()
                    .flat_map(|chunk| chunk.split(BLOCK_SEPARATOR))
                    .map(str::to_string)
                    .collect();
                assert_eq!(rebuilt, blocks, "document {document:?} with n={n}");
            }
        }
    }

    #[test]
    fn test_split_counts_blocks() {
        let corpus = CorpusChunker::new(2).split(DOC);
        assert_eq!(corpus.blocks, 5);
        assert_eq!(corpus.chunks, CorpusChunker::new(2).chunk(DOC));
        assert_eq!(CorpusChunker::default().split(" \n\n"), ChunkedCorpus::default());
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let chunker = CorpusChunker::new(3);
        assert_eq!(chunker.chunk(DOC), chunker.chunk(DOC));
    }

    #[tokio::test]
    async fn test_chunk_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "alpha\n\nbeta\n\ngamma").unwrap();

        let corpus = CorpusChunker::new(2).chunk_file(&path).await.unwrap();
        assert_eq!(corpus.blocks, 3);
        assert_eq!(corpus.chunks, vec!["alpha\n\nbeta", "gamma"]);

        let missing = CorpusChunker::default()
            .chunk_file(&dir.path().join("missing.txt"))
            .await;
        assert!(matches!(missing, Err(RetrievalError::Storage(_))));
    }
}
