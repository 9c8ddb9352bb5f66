//! Content block accumulation for prompt, message, and thought segments.

use acp_protocol::ContentBlock;
use serde_json::Value;

use crate::error::TranscriptError;

/// Ordered, append-only run of content blocks.
///
/// Blocks keep receipt order. Adjacent text blocks are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBlocks {
    blocks: Vec<ContentBlock>,
}

impl ContentBlocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an already validated block and returns the new block count.
    pub fn push(&mut self, block: ContentBlock) -> usize {
        self.blocks.push(block);
        self.blocks.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter()
    }

    /// Concatenated text of every text block, in order.
    #[must_use]
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Checks a raw payload against the known block shapes.
pub fn validate(raw: &Value) -> Result<ContentBlock, TranscriptError> {
    ContentBlock::from_value(raw).map_err(TranscriptError::malformed_block)
}

/// Validates `raw` and appends it to `blocks`, returning the updated count.
pub fn append(blocks: &mut ContentBlocks, raw: &Value) -> Result<usize, TranscriptError> {
    let block = validate(raw)?;
    Ok(blocks.push(block))
}
