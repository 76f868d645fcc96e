use std::fmt;

use thiserror::Error;

/// Leading signature word of every absolute format block.
pub const SIGNATURE: u16 = 1;

/// Header bytes covered by the length field: signature, length, address.
pub const HEADER_LEN: usize = 6;

/// Address stamped on the terminating block; odd, which the loader takes as
/// end-of-load.
pub const HALT_ADDR: u16 = 1;

/// Most data bytes one block may carry.
pub const MAX_BLOCK_DATA: usize = 64 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("block data exceeds {} bytes", MAX_BLOCK_DATA)]
pub struct CapacityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Data,
    Halt,
}

/// What one flush wrote, for listings and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    pub kind: BlockKind,
    pub origin: u32,
    pub data_len: usize,
    pub checksum: u8,
}

impl fmt::Display for BlockSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BlockKind::Data => "BLK",
            BlockKind::Halt => "HALT",
        };
        write!(
            f,
            "wrote {} org {:06o} len {:06o} cksum {:04o}(0x{:02x})",
            kind, self.origin, self.data_len, self.checksum, self.checksum
        )
    }
}

/// Accumulates data bytes for the pending block and frames finished blocks
/// into the in-memory image.
///
/// The pc advances as data is appended; the origin is the load address of
/// the pending block. After a flush the origin catches up to the pc, so
/// consecutive blocks are contiguous unless an origin directive intervenes.
#[derive(Debug, Default)]
pub struct BlockWriter {
    image: Vec<u8>,
    data: Vec<u8>,
    org: u32,
    pc: u32,
}

impl BlockWriter {
    pub fn new() -> BlockWriter {
        BlockWriter::default()
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Rebase the next block. The caller flushes any pending data first.
    pub fn set_origin(&mut self, addr: u32) {
        self.org = addr;
        self.pc = addr;
    }

    /// Append one word little-endian; pc advances by 2.
    pub fn push_word(&mut self, word: u16) -> Result<(), CapacityError> {
        if self.data.len() + 2 > MAX_BLOCK_DATA {
            return Err(CapacityError);
        }
        self.data.extend_from_slice(&word.to_le_bytes());
        self.pc += 2;
        Ok(())
    }

    /// Append one byte; pc advances by 1.
    pub fn push_byte(&mut self, byte: u8) -> Result<(), CapacityError> {
        if self.data.len() + 1 > MAX_BLOCK_DATA {
            return Err(CapacityError);
        }
        self.data.push(byte);
        self.pc += 1;
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.data.is_empty()
    }

    /// Frame the pending block into the image.
    ///
    /// A data flush with nothing pending writes nothing. A halt flush always
    /// writes, with the address field forced to the odd sentinel. The
    /// trailing checksum byte makes the whole frame sum to 0 mod 256.
    #[tracing::instrument]
    pub fn flush(&mut self, kind: BlockKind) -> Option<BlockSummary> {
        if kind == BlockKind::Data && self.data.is_empty() {
            return None;
        }
        let addr = match kind {
            BlockKind::Data => (self.org & 0xffff) as u16,
            BlockKind::Halt => HALT_ADDR,
        };

        let length = (self.data.len() + HEADER_LEN) as u16;
        let start = self.image.len();
        self.image.extend_from_slice(&SIGNATURE.to_le_bytes());
        self.image.extend_from_slice(&length.to_le_bytes());
        self.image.extend_from_slice(&addr.to_le_bytes());
        self.image.extend_from_slice(&self.data);
        let checksum = checksum(&self.image[start..]);
        self.image.push(checksum);

        let summary = BlockSummary {
            kind,
            origin: u32::from(addr),
            data_len: self.data.len(),
            checksum,
        };
        self.data.clear();
        self.org = self.pc;
        Some(summary)
    }

    /// The finished image. Meaningful once the halt block has been flushed.
    pub fn into_image(self) -> Vec<u8> {
        self.image
    }
}

/// Two's complement low byte that makes `frame` sum to 0 mod 256.
pub fn checksum(frame: &[u8]) -> u8 {
    let sum = frame.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_neg()
}
