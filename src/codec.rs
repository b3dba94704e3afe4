//! Binary layout of the containers, in host byte order.
//!
//! - fixed-width primitives: their native-endian bytes; `bool` is one byte;
//! - `String`: `u32` byte length, then the UTF-8 bytes;
//! - `Option<T>`: a `u8` tag (0 or 1), then `T` when present;
//! - [`Array`]: `u64` length, then each element;
//! - [`HashSet`]: `u32` count, then each key in bucket order;
//! - [`HashMap`]: `u32` count, then key and value pairs in bucket order;
//! - [`ArrayMap`]: `u64` length, then key and value pairs in list order.
//!
//! Nothing is portable across byte orders or pointer widths. A failed
//! `decode` returns no container, so no partially read state escapes.
//! Table streams carrying the empty sentinel or a repeated key are rejected.

use crate::array::Array;
use crate::array_map::ArrayMap;
use crate::capability::TableKey;
use crate::error::CodecError;
use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use std::io::{self, Read, Write};

pub trait Encode {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError>;
}

pub trait Decode: Sized {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError>;
}

macro_rules! impl_codec_for_fixed {
    ($($t:ty),* $(,)?) => {$(
        impl Encode for $t {
            #[inline]
            fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
                out.write_all(&self.to_ne_bytes())?;
                Ok(())
            }
        }

        impl Decode for $t {
            #[inline]
            fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
                let mut bytes = [0u8; core::mem::size_of::<$t>()];
                input.read_exact(&mut bytes)?;
                Ok(<$t>::from_ne_bytes(bytes))
            }
        }
    )*};
}

impl_codec_for_fixed!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

impl Encode for bool {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        u8::from(*self).encode(out)
    }
}

impl Decode for bool {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        match u8::decode(input)? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::InvalidTag(tag)),
        }
    }
}

impl Encode for char {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        u32::from(*self).encode(out)
    }
}

impl Decode for char {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        char::from_u32(u32::decode(input)?).ok_or(CodecError::InvalidUtf8)
    }
}

impl Encode for str {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        let len = u32::try_from(self.len()).map_err(|_| CodecError::LengthOverflow(self.len() as u64))?;
        len.encode(out)?;
        out.write_all(self.as_bytes())?;
        Ok(())
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        self.as_str().encode(out)
    }
}

impl Decode for String {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        let len = u32::decode(input)?;
        // Grows with the bytes actually read, so a corrupt length cannot
        // force a huge allocation up front.
        let mut bytes = Vec::new();
        input.take(u64::from(len)).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != u64::from(len) {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        match self {
            None => 0u8.encode(out),
            Some(v) => {
                1u8.encode(out)?;
                v.encode(out)
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        match u8::decode(input)? {
            0 => Ok(None),
            1 => Ok(Some(T::decode(input)?)),
            tag => Err(CodecError::InvalidTag(tag)),
        }
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        (**self).encode(out)
    }
}

// A writer never emits the sentinel, since tables cannot store it.
fn table_key<K: TableKey>(key: K) -> Result<K, CodecError> {
    if TableKey::is_empty(&key) {
        return Err(CodecError::SentinelKey);
    }
    Ok(key)
}

fn length_to_usize(len: u64) -> Result<usize, CodecError> {
    usize::try_from(len).map_err(|_| CodecError::LengthOverflow(len))
}

fn count_to_u32(count: usize) -> Result<u32, CodecError> {
    u32::try_from(count).map_err(|_| CodecError::LengthOverflow(count as u64))
}

impl<T: Encode> Encode for Array<T> {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        (self.len() as u64).encode(out)?;
        for element in self.iter() {
            element.encode(out)?;
        }
        Ok(())
    }
}

impl<T: Decode> Decode for Array<T> {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        let len = length_to_usize(u64::decode(input)?)?;
        let mut array = Array::try_new(len.max(1))?;
        for _ in 0..len {
            array.add(T::decode(input)?)?;
        }
        Ok(array)
    }
}

impl<K: TableKey + Encode> Encode for HashSet<K> {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        count_to_u32(self.len())?.encode(out)?;
        for key in self.iter() {
            key.encode(out)?;
        }
        Ok(())
    }
}

impl<K: TableKey + Decode> Decode for HashSet<K> {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        let count = u32::decode(input)? as usize;
        let mut set = HashSet::try_new(2 * count.max(1))?;
        for _ in 0..count {
            if !set.add(table_key(K::decode(input)?)?)? {
                return Err(CodecError::DuplicateKey);
            }
        }
        Ok(set)
    }
}

impl<K: TableKey + Encode, V: Encode> Encode for HashMap<K, V> {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        count_to_u32(self.len())?.encode(out)?;
        for (key, value) in self.iter() {
            key.encode(out)?;
            value.encode(out)?;
        }
        Ok(())
    }
}

impl<K: TableKey + Decode, V: Decode> Decode for HashMap<K, V> {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        let count = u32::decode(input)? as usize;
        let mut map = HashMap::try_new(2 * count.max(1))?;
        for _ in 0..count {
            let key = table_key(K::decode(input)?)?;
            let value = V::decode(input)?;
            if map.put(key, value)?.is_some() {
                return Err(CodecError::DuplicateKey);
            }
        }
        Ok(map)
    }
}

impl<K: Encode, V: Encode> Encode for ArrayMap<K, V> {
    fn encode<W: Write>(&self, out: &mut W) -> Result<(), CodecError> {
        (self.len() as u64).encode(out)?;
        for (key, value) in self.iter() {
            key.encode(out)?;
            value.encode(out)?;
        }
        Ok(())
    }
}

impl<K: Eq + Decode, V: Decode> Decode for ArrayMap<K, V> {
    fn decode<R: Read>(input: &mut R) -> Result<Self, CodecError> {
        let len = length_to_usize(u64::decode(input)?)?;
        let mut map = ArrayMap::try_new(len.max(1))?;
        for _ in 0..len {
            let key = K::decode(input)?;
            let value = V::decode(input)?;
            map.put(key, value)?;
        }
        Ok(map)
    }
}
