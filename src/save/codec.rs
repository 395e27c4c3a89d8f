// src/save/codec.rs
//
// Little-endian primitives for the save file. Strings carry a 7-bit
// variable-length byte count followed by UTF-8 bytes.

use crate::constants::MAX_SAVE_STRING_LEN;
use crate::error::{is_truncation, AppError};
use std::io::{Read, Write};

pub struct SaveWriter<W: Write> {
    inner: W,
}

impl<W: Write> SaveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), AppError> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), AppError> {
        self.write_u8(u8::from(value))
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), AppError> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), AppError> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<(), AppError> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Element count prefix. Counts are signed 32-bit on disk.
    pub fn write_count(&mut self, count: usize) -> Result<(), AppError> {
        let count = i32::try_from(count).map_err(|_| AppError::save_format(format!("count {count} does not fit in a save file")))?;
        self.write_i32(count)
    }

    fn write_varint(&mut self, mut value: u32) -> Result<(), AppError> {
        while value >= 0x80 {
            let low = u8::try_from(value & 0x7F).unwrap_or_default();
            self.write_u8(low | 0x80)?;
            value >>= 7;
        }
        self.write_u8(u8::try_from(value).unwrap_or_default())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), AppError> {
        let bytes = value.as_bytes();
        if bytes.len() > MAX_SAVE_STRING_LEN {
            return Err(AppError::save_format(format!("string of {} bytes is too long", bytes.len())));
        }
        let len = u32::try_from(bytes.len()).map_err(|_| AppError::save_format("string length overflow"))?;
        self.write_varint(len)?;
        self.inner.write_all(bytes)?;
        Ok(())
    }
}

pub struct SaveReader<R: Read> {
    inner: R,
}

impl<R: Read> SaveReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_exact<const N: usize>(&mut self) -> Result<[u8; N], AppError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if is_truncation(&e) {
                AppError::save_format("unexpected end of save data")
            } else {
                AppError::Io(e)
            }
        })?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, AppError> {
        let [b] = self.read_exact::<1>()?;
        Ok(b)
    }

    pub fn read_bool(&mut self) -> Result<bool, AppError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(AppError::save_format(format!("invalid boolean byte {other}"))),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32, AppError> {
        Ok(u32::from_le_bytes(self.read_exact::<4>()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, AppError> {
        Ok(i32::from_le_bytes(self.read_exact::<4>()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, AppError> {
        Ok(u64::from_le_bytes(self.read_exact::<8>()?))
    }

    /// Element count; negative counts are rejected.
    pub fn read_count(&mut self) -> Result<usize, AppError> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| AppError::save_format(format!("negative count {count}")))
    }

    fn read_varint(&mut self) -> Result<u32, AppError> {
        let mut value: u32 = 0;
        for shift in [0u32, 7, 14, 21, 28] {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(AppError::save_format("string length prefix is too long"))
    }

    pub fn read_string(&mut self) -> Result<String, AppError> {
        let len = usize::try_from(self.read_varint()?).unwrap_or(usize::MAX);
        if len > MAX_SAVE_STRING_LEN {
            return Err(AppError::save_format(format!("string of {len} bytes is too long")));
        }
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes).map_err(|e| {
            if is_truncation(&e) {
                AppError::save_format("unexpected end of save data")
            } else {
                AppError::Io(e)
            }
        })?;
        String::from_utf8(bytes).map_err(|_| AppError::save_format("string is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_primitives_are_little_endian() {
        let mut writer = SaveWriter::new(Vec::new());
        writer.write_u32(0x0102_0304).unwrap();
        writer.write_i32(-2).unwrap();
        writer.write_bool(true).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes, vec![0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF, 0x01]);
    }

    #[test]
    fn test_string_length_prefix() {
        let mut writer = SaveWriter::new(Vec::new());
        writer.write_string("Ledge").unwrap();
        let long = "x".repeat(200);
        writer.write_string(&long).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes[0], 5);
        assert_eq!(&bytes[1..6], b"Ledge");
        // 200 = 0b1_1001000 -> 0xC8 0x01
        assert_eq!(&bytes[6..8], &[0xC8, 0x01]);

        let mut reader = SaveReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_string().unwrap(), "Ledge");
        assert_eq!(reader.read_string().unwrap(), long);
    }

    #[test]
    fn test_truncated_input_is_a_format_error() {
        let mut reader = SaveReader::new(Cursor::new(vec![0x01, 0x02]));
        assert!(matches!(reader.read_u32(), Err(AppError::SaveFormat { .. })));
    }

    #[test]
    fn test_invalid_bool_and_negative_count() {
        let mut reader = SaveReader::new(Cursor::new(vec![0x02]));
        assert!(reader.read_bool().is_err());

        let mut reader = SaveReader::new(Cursor::new((-1i32).to_le_bytes().to_vec()));
        assert!(reader.read_count().is_err());
    }

    #[test]
    fn test_oversized_string_rejected() {
        let mut writer = SaveWriter::new(Vec::new());
        assert!(writer.write_string(&"x".repeat(MAX_SAVE_STRING_LEN + 1)).is_err());

        let mut reader = SaveReader::new(Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]));
        assert!(reader.read_string().is_err());
    }
}
