use anyhow::{Context, Result};
use std::path::Path;

use a32dis::listing::INSTR_SIZE;

/// Window into a raw image file: `skip` bytes dropped from the front, at most
/// `len` bytes kept, mapped at `base`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadWindow {
    pub base: u32,
    pub skip: usize,
    pub len: Option<usize>,
}

/// A contiguous run of code mapped at `base`, read as 4-byte slots.
#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: u32,
    pub bytes: Vec<u8>,
}

impl Segment {
    pub fn end(&self) -> u32 {
        self.base.wrapping_add(self.bytes.len() as u32)
    }

    /// Complete slots only; a short tail is not a word.
    pub fn word_count(&self) -> usize {
        self.bytes.len() / INSTR_SIZE
    }

    pub fn tail_len(&self) -> usize {
        self.bytes.len() % INSTR_SIZE
    }

    pub fn slot_addr(&self, index: usize) -> u32 {
        self.base.wrapping_add((index * INSTR_SIZE) as u32)
    }

    /// Bytes of the slot starting at `addr`, if a whole slot starts there.
    pub fn slot(&self, addr: u32) -> Option<&[u8]> {
        let off = addr.checked_sub(self.base)? as usize;
        if off % INSTR_SIZE != 0 || off / INSTR_SIZE >= self.word_count() {
            return None;
        }
        self.bytes.get(off..off + INSTR_SIZE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Image {
    pub segments: Vec<Segment>,
}

impl Image {
    pub fn slot(&self, addr: u32) -> Option<&[u8]> {
        self.segments.iter().find_map(|s| s.slot(addr))
    }
}

pub fn load_raw_bin(path: &Path, win: LoadWindow) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let payload = file.get(win.skip..).context("--skip exceeds file size")?;
    let payload = match win.len {
        Some(lim) => payload.get(..lim).context("--len exceeds remaining file size after skip")?,
        None => payload,
    };
    let seg = Segment { name: "segment0".into(), base: win.base, bytes: payload.to_vec() };
    if seg.tail_len() != 0 {
        tracing::warn!(tail = seg.tail_len(), "image length is not a multiple of 4; trailing bytes are not listed");
    }
    tracing::debug!(path = %path.display(), base = win.base, words = seg.word_count(), "loaded raw image");
    Ok(Image { segments: vec![seg] })
}
