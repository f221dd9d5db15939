//! Adaptive dictionary (LZW family) stage.
//!
//! Two departures from textbook LZW are part of the format:
//!
//! * Codes are always [`CODE_WIDTH`] bits wide. The dictionary stops growing
//!   once `next_code` passes [`MAX_CODE`] but existing entries stay usable.
//! * A code that is not in the dictionary is stored under that code itself
//!   (`previous + previous[0]`), not under `next_code`. The regular growth
//!   step then still runs for the same code word.
//!
//! A code above [`MAX_CODE`] ends the stream, as does running out of input.

use std::collections::HashMap;

use crate::{
    CODE_WIDTH, MAX_CODE,
    bitstream::{BitReader, BitWriter},
    error::XliError,
};

const FIRST_CODE: u16 = 256;
const TABLE_LEN: usize = MAX_CODE as usize + 1;

pub struct Decompressor<'a> {
    reader: BitReader<'a>,
    strings: Vec<Option<Vec<u8>>>,
    next_code: u16,
    previous: Vec<u8>,
    done: bool,
}

impl<'a> Decompressor<'a> {
    pub fn new(compressed: &'a [u8]) -> Self {
        let mut strings = vec![None; TABLE_LEN];
        for (code, entry) in strings.iter_mut().take(FIRST_CODE as usize).enumerate() {
            *entry = Some(vec![code as u8]);
        }
        Self {
            reader: BitReader::with_width(compressed, CODE_WIDTH),
            strings,
            next_code: FIRST_CODE,
            previous: Vec::new(),
            done: false,
        }
    }

    /// Number of dictionary entries currently defined.
    pub fn dictionary_len(&self) -> usize {
        self.strings.iter().filter(|s| s.is_some()).count()
    }

    pub fn next_code(&self) -> u16 {
        self.next_code
    }

    fn read_string(&mut self) -> Result<Option<Vec<u8>>, XliError> {
        let Some(code) = self.reader.read_code() else {
            return Ok(None);
        };
        if code > MAX_CODE {
            return Ok(None);
        }
        let idx = code as usize;

        let current = match &self.strings[idx] {
            Some(s) => s.clone(),
            None => {
                let first = *self
                    .previous
                    .first()
                    .ok_or(XliError::UnknownLeadingCode { code })?;
                let mut s = self.previous.clone();
                s.push(first);
                self.strings[idx] = Some(s.clone());
                s
            }
        };

        if !self.previous.is_empty() && self.next_code <= MAX_CODE {
            let mut s = self.previous.clone();
            s.push(current[0]);
            self.strings[self.next_code as usize] = Some(s);
            self.next_code += 1;
            if self.next_code > MAX_CODE {
                log::trace!("dictionary full at {} entries", self.dictionary_len());
            }
        }

        self.previous.clone_from(&current);
        Ok(Some(current))
    }
}

impl Iterator for Decompressor<'_> {
    type Item = Result<Vec<u8>, XliError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.read_string().transpose();
        if !matches!(res, Some(Ok(_))) {
            self.done = true;
        }
        res
    }
}

/// Decompress a whole payload into one byte buffer.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, XliError> {
    let mut out = Vec::new();
    for s in Decompressor::new(compressed) {
        out.extend_from_slice(&s?);
    }
    Ok(out)
}

/// Compress with the fixed code width and dictionary cap the decoder uses.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut dict: HashMap<Vec<u8>, u16> = (0..FIRST_CODE).map(|c| (vec![c as u8], c)).collect();
    let mut next_code = FIRST_CODE;
    let mut writer = BitWriter::with_width(CODE_WIDTH);
    let mut w: Vec<u8> = Vec::new();

    for &c in data {
        w.push(c);
        if dict.contains_key(&w) {
            continue;
        }
        if next_code <= MAX_CODE {
            dict.insert(w.clone(), next_code);
            next_code += 1;
        }
        w.pop();
        writer.write_code(dict[&w]);
        w.clear();
        w.push(c);
    }
    if !w.is_empty() {
        writer.write_code(dict[&w]);
    }
    writer.finish()
}
