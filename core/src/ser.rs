// Copyright 2016 The Grin Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Binary stream serialization and deserialization for core types, from
//! trusted `Write`/`Read` implementations. Header fields are
//! little-endian, matching the reference client's wire layout;
//! chain-work stays big-endian because that's how it's defined.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use failure::Fail;
use std::io::{self, Read, Write};

/// Possible errors deriving from serializing or deserializing.
#[derive(Debug, Fail)]
pub enum Error {
	/// Wraps an io error produced when reading or writing
	#[fail(display = "IO error: {}", _0)]
	IOErr(String),
	/// Data wasn't in a consumable format
	#[fail(display = "corrupted data")]
	CorruptedData,
	/// When asked to read too much data
	#[fail(display = "read too large: {}", _0)]
	TooLargeReadErr(String),
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::IOErr(e.to_string())
	}
}

/// Max size of a single `read_fixed_bytes` call, a basic DoS guard.
const MAX_FIXED_READ: usize = 100_000;

/// Write primitives used to serialize core types, little-endian.
pub trait Writer {
	/// Writes a u8
	fn write_u8(&mut self, n: u8) -> Result<(), Error>;
	/// Writes a u32, little-endian
	fn write_u32(&mut self, n: u32) -> Result<(), Error>;
	/// Writes a u64, little-endian
	fn write_u64(&mut self, n: u64) -> Result<(), Error>;
	/// Writes a i64, little-endian
	fn write_i64(&mut self, n: i64) -> Result<(), Error>;
	/// Writes a u32, big-endian
	fn write_u32_be(&mut self, n: u32) -> Result<(), Error>;
	/// Writes raw bytes as-is
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

/// Read primitives used to deserialize core types, little-endian.
pub trait Reader {
	/// Reads a u8
	fn read_u8(&mut self) -> Result<u8, Error>;
	/// Reads a u32, little-endian
	fn read_u32(&mut self) -> Result<u32, Error>;
	/// Reads a u64, little-endian
	fn read_u64(&mut self) -> Result<u64, Error>;
	/// Reads a i64, little-endian
	fn read_i64(&mut self) -> Result<i64, Error>;
	/// Reads a u32, big-endian
	fn read_u32_be(&mut self) -> Result<u32, Error>;
	/// Reads exactly `length` bytes
	fn read_fixed_bytes(&mut self, length: usize) -> Result<Vec<u8>, Error>;
	/// Convenience to read a 32-byte array
	fn read_32_bytes(&mut self) -> Result<[u8; 32], Error> {
		let v = self.read_fixed_bytes(32)?;
		let mut out = [0u8; 32];
		out.copy_from_slice(&v);
		Ok(out)
	}
}

/// Trait every binary-serializable type implements.
pub trait Writeable {
	/// Write `self` to `writer`.
	fn write<W: Writer>(&self, writer: &mut W) -> Result<(), Error>;
}

/// Trait every binary-deserializable type implements.
pub trait Readable: Sized {
	/// Read `Self` from `reader`.
	fn read<R: Reader>(reader: &mut R) -> Result<Self, Error>;
}

struct BinWriter<'a, W: Write + 'a> {
	sink: &'a mut W,
}

impl<'a, W: Write> Writer for BinWriter<'a, W> {
	fn write_u8(&mut self, n: u8) -> Result<(), Error> {
		self.sink.write_u8(n).map_err(From::from)
	}
	fn write_u32(&mut self, n: u32) -> Result<(), Error> {
		self.sink.write_u32::<LittleEndian>(n).map_err(From::from)
	}
	fn write_u64(&mut self, n: u64) -> Result<(), Error> {
		self.sink.write_u64::<LittleEndian>(n).map_err(From::from)
	}
	fn write_i64(&mut self, n: i64) -> Result<(), Error> {
		self.sink.write_i64::<LittleEndian>(n).map_err(From::from)
	}
	fn write_u32_be(&mut self, n: u32) -> Result<(), Error> {
		self.sink.write_u32::<BigEndian>(n).map_err(From::from)
	}
	fn write_fixed_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.sink.write_all(bytes).map_err(From::from)
	}
}

struct BinReader<'a, R: Read + 'a> {
	source: &'a mut R,
}

impl<'a, R: Read> Reader for BinReader<'a, R> {
	fn read_u8(&mut self) -> Result<u8, Error> {
		self.source.read_u8().map_err(From::from)
	}
	fn read_u32(&mut self) -> Result<u32, Error> {
		self.source.read_u32::<LittleEndian>().map_err(From::from)
	}
	fn read_u64(&mut self) -> Result<u64, Error> {
		self.source.read_u64::<LittleEndian>().map_err(From::from)
	}
	fn read_i64(&mut self) -> Result<i64, Error> {
		self.source.read_i64::<LittleEndian>().map_err(From::from)
	}
	fn read_u32_be(&mut self) -> Result<u32, Error> {
		self.source.read_u32::<BigEndian>().map_err(From::from)
	}
	fn read_fixed_bytes(&mut self, length: usize) -> Result<Vec<u8>, Error> {
		if length > MAX_FIXED_READ {
			return Err(Error::TooLargeReadErr(format!(
				"fixed bytes length too large: {}",
				length
			)));
		}
		let mut buf = vec![0u8; length];
		self.source.read_exact(&mut buf)?;
		Ok(buf)
	}
}

/// Serializes a Writeable into any `std::io::Write` implementation.
pub fn serialize<W: Writeable>(sink: &mut dyn Write, thing: &W) -> Result<(), Error> {
	let mut writer = BinWriter { sink };
	thing.write(&mut writer)
}

/// Serializes a Writeable directly into an in-memory `Vec<u8>`.
pub fn ser_vec<W: Writeable>(thing: &W) -> Result<Vec<u8>, Error> {
	let mut vec = Vec::new();
	serialize(&mut vec, thing)?;
	Ok(vec)
}

/// Deserializes a Readable from any `std::io::Read` implementation.
pub fn deserialize<T: Readable>(source: &mut dyn Read) -> Result<T, Error> {
	let mut reader = BinReader { source };
	T::read(&mut reader)
}
