//! Helpers for walking and building heterogeneous RLP lists.
//!
//! `alloy-rlp` handles single items well but LES messages are nested lists of
//! mixed records, keyed pairs and optional tails. [`ListReader`] walks such a
//! list one item at a time with every length checked against the bytes that are
//! actually left; [`ListWriter`] is the encoding counterpart.

use alloy_primitives::{B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header};
use bytes::{Bytes, BytesMut};

use crate::error::{DecodeError, Result};

const HASH_LEN: usize = 32;

/// Cursor over the items of one RLP list.
#[derive(Debug, Clone, Copy)]
pub struct ListReader<'a> {
    payload: &'a [u8],
}

impl<'a> ListReader<'a> {
    /// Open the list that must make up the whole of `src`.
    ///
    /// Bytes after the list are rejected.
    pub fn top_level(src: &'a [u8]) -> Result<Self> {
        let mut buf = src;
        let reader = Self::open(&mut buf)?;
        if !buf.is_empty() {
            return Err(DecodeError::Malformed("trailing bytes after message"));
        }
        Ok(reader)
    }

    /// Open the list at the front of `buf`, advancing past it.
    pub fn open(buf: &mut &'a [u8]) -> Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString.into());
        }
        let payload = take(buf, header.payload_length)?;
        Ok(Self { payload })
    }

    /// Walk a bare sequence of items that is not wrapped in a list header.
    pub fn over_items(items: &'a [u8]) -> Self {
        Self { payload: items }
    }

    /// True once every item has been consumed.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// True if the next item is a list. False when empty.
    pub fn next_is_list(&self) -> bool {
        self.payload
            .first()
            .is_some_and(|b| *b >= alloy_rlp::EMPTY_LIST_CODE)
    }

    /// Decode the next item with its `alloy-rlp` rules.
    pub fn item<T: Decodable>(&mut self, field: &'static str) -> Result<T> {
        self.ensure(field)?;
        Ok(T::decode(&mut self.payload)?)
    }

    /// Open the next item as a nested list.
    pub fn list(&mut self, field: &'static str) -> Result<ListReader<'a>> {
        self.ensure(field)?;
        Self::open(&mut self.payload)
    }

    /// Payload of the next item, which must be a byte string.
    pub fn string(&mut self, field: &'static str) -> Result<&'a [u8]> {
        self.ensure(field)?;
        let header = Header::decode(&mut self.payload)?;
        if header.list {
            return Err(alloy_rlp::Error::UnexpectedList.into());
        }
        take(&mut self.payload, header.payload_length)
    }

    /// The next item exactly as it appears on the wire, header included.
    pub fn raw(&mut self, field: &'static str) -> Result<&'a [u8]> {
        self.ensure(field)?;
        let start = self.payload;
        let header = Header::decode(&mut self.payload)?;
        take(&mut self.payload, header.payload_length)?;
        Ok(&start[..start.len() - self.payload.len()])
    }

    /// A 32-byte hash, left-padded when the sender stripped leading zeros.
    pub fn hash(&mut self, field: &'static str) -> Result<B256> {
        let bytes = self.string(field)?;
        if bytes.len() > HASH_LEN {
            return Err(alloy_rlp::Error::Overflow.into());
        }
        let mut out = B256::ZERO;
        out.0[HASH_LEN - bytes.len()..].copy_from_slice(bytes);
        Ok(out)
    }

    /// A 256-bit integer, tolerating leading zero bytes.
    pub fn u256(&mut self, field: &'static str) -> Result<U256> {
        let bytes = self.string(field)?;
        U256::try_from_be_slice(bytes).ok_or(DecodeError::Rlp(alloy_rlp::Error::Overflow))
    }

    /// Decode every remaining item with `decode`, which must consume exactly one item per call.
    pub fn collect<T>(mut self, mut decode: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while !self.is_empty() {
            out.push(decode(&mut self)?);
        }
        Ok(out)
    }

    /// Require that no items are left over.
    pub fn finish(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::Malformed("unexpected trailing list items"))
        }
    }

    fn ensure(&self, field: &'static str) -> Result<()> {
        if self.is_empty() {
            return Err(DecodeError::MissingField(field));
        }
        Ok(())
    }
}

fn take<'a>(buf: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
    if buf.len() < len {
        return Err(alloy_rlp::Error::InputTooShort.into());
    }
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    Ok(head)
}

/// Builds one RLP list from items of mixed types.
#[derive(Debug, Default, Clone)]
pub struct ListWriter {
    payload: BytesMut,
}

impl ListWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list whose items all share one type.
    pub fn from_items<'i, T, I>(items: I) -> Self
    where
        T: Encodable + 'i,
        I: IntoIterator<Item = &'i T>,
    {
        let mut list = Self::new();
        for item in items {
            list.push(item);
        }
        list
    }

    /// Append one encodable item.
    pub fn push<T: Encodable + ?Sized>(&mut self, item: &T) -> &mut Self {
        item.encode(&mut self.payload);
        self
    }

    /// Append a nested list.
    pub fn push_list(&mut self, list: ListWriter) -> &mut Self {
        list.encode_into(&mut self.payload);
        self
    }

    /// Append an item that is already RLP encoded.
    pub fn push_raw(&mut self, rlp: &[u8]) -> &mut Self {
        self.payload.extend_from_slice(rlp);
        self
    }

    /// Write the list header and payload to `out`.
    pub fn encode_into(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload.len(),
        }
        .encode(out);
        out.put_slice(&self.payload);
    }

    /// Encoded length including the list header.
    pub fn encoded_len(&self) -> usize {
        Header {
            list: true,
            payload_length: self.payload.len(),
        }
        .length()
            + self.payload.len()
    }

    /// Encode the list into a fresh buffer.
    pub fn finish(self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out.freeze()
    }
}
