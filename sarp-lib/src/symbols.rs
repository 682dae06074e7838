//! Reading recorded demodulator output.
use std::io::{ErrorKind, Read};

use tracing::debug;

use crate::manchester::SYMBOL_BLOCK_LEN;
use crate::prelude::*;

/// Iterates over symbol blocks read from a byte stream. Created using [read_symbol_blocks].
pub struct SymbolBlocks<R>
where
    R: Read,
{
    reader: R,
    buf: Vec<u8>,
    count: usize,
    done: bool,
}

impl<R> SymbolBlocks<R>
where
    R: Read,
{
    /// Fill the block buffer, returning `false` at the end of the stream.
    fn fill(&mut self) -> Result<bool> {
        if let Err(err) = self.reader.read_exact(&mut self.buf) {
            if err.kind() == ErrorKind::UnexpectedEof {
                return Ok(false);
            }
            return Err(err.into());
        }
        Ok(true)
    }
}

impl<R> Iterator for SymbolBlocks<R>
where
    R: Read,
{
    type Item = Result<Vec<bool>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(true) => {
                self.count += 1;
                Some(Ok(self.buf.iter().map(|b| *b == 1).collect()))
            }
            Ok(false) => {
                debug!(blocks = self.count, "end of symbol stream");
                self.done = true;
                None
            }
            Err(err) => {
                // a failed read_exact leaves the stream at an unknown symbol offset
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Creates an iterator producing [SYMBOL_BLOCK_LEN] symbol blocks from a stream of one byte
/// per symbol, where a byte value of 1 is a `true` symbol and any other value `false`.
///
/// Blocks are only produced if a full block is available, i.e., any partial block at the
/// end of the stream is dropped.
///
/// # Errors
/// A read error other than reaching the end of the stream is passed on for the consumer to
/// handle, after which the iterator ends since block alignment is lost.
pub fn read_symbol_blocks<R>(reader: R) -> SymbolBlocks<R>
where
    R: Read,
{
    SymbolBlocks {
        reader,
        buf: vec![0u8; SYMBOL_BLOCK_LEN],
        count: 0,
        done: false,
    }
}
