//! Typed field values decoded from record bytes.

use std::fmt;

use crate::common::{Error, Result};
use crate::table::schema::{Field, FieldType, Schema};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f64),
    Char(String),
}

impl Value {
    /// Decode one field from its raw bytes.
    ///
    /// `raw` must be exactly `field.length()` bytes. Integers and floats
    /// are native byte order; character fields are NUL-padded and the
    /// padding is trimmed on decode.
    pub fn decode(field: &Field, raw: &[u8]) -> Result<Value> {
        if raw.len() != field.length() {
            return Err(Error::OutOfBounds {
                offset: 0,
                len: field.length(),
            });
        }

        Ok(match field.field_type() {
            FieldType::Int => {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(raw);
                Value::Int(i32::from_ne_bytes(bytes))
            }
            FieldType::Float => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(raw);
                Value::Float(f64::from_ne_bytes(bytes))
            }
            FieldType::Char => {
                let text = String::from_utf8_lossy(raw);
                Value::Char(text.trim_end_matches('\0').to_string())
            }
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
        }
    }
}

impl Schema {
    /// Decode a full record from its raw bytes.
    ///
    /// `record` must hold at least `record_length()` bytes; trailing bytes
    /// are ignored.
    pub fn decode_record(&self, record: &[u8]) -> Result<Vec<Value>> {
        if record.len() < self.record_length() {
            return Err(Error::OutOfBounds {
                offset: 0,
                len: self.record_length(),
            });
        }

        let mut values = Vec::with_capacity(self.len());
        let mut offset = 0;
        for field in self.fields() {
            values.push(Value::decode(field, &record[offset..offset + field.length()])?);
            offset += field.length();
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_int() {
        let raw = 40i32.to_ne_bytes();
        assert_eq!(Value::decode(&Field::int(), &raw).unwrap(), Value::Int(40));
    }

    #[test]
    fn test_decode_float() {
        let raw = 2.5f64.to_ne_bytes();
        assert_eq!(
            Value::decode(&Field::float(), &raw).unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn test_decode_char_trims_padding() {
        let mut raw = [0u8; 20];
        raw[..4].copy_from_slice(b"Lucy");
        assert_eq!(
            Value::decode(&Field::chars(20), &raw).unwrap(),
            Value::Char("Lucy".to_string())
        );
    }

    #[test]
    fn test_decode_wrong_length_fails() {
        let raw = [0u8; 2];
        assert!(Value::decode(&Field::int(), &raw).is_err());
    }

    #[test]
    fn test_decode_record() {
        let schema = Schema::new(vec![Field::int(), Field::chars(20), Field::int()]);

        let mut record = vec![0u8; schema.record_length()];
        record[..4].copy_from_slice(&1i32.to_ne_bytes());
        record[4..9].copy_from_slice(b"Adams");
        record[24..28].copy_from_slice(&8i32.to_ne_bytes());

        let values = schema.decode_record(&record).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Int(1),
                Value::Char("Adams".to_string()),
                Value::Int(8)
            ]
        );
    }

    #[test]
    fn test_decode_record_too_short_fails() {
        let schema = Schema::new(vec![Field::int()]);
        assert!(schema.decode_record(&[0u8; 2]).is_err());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Int(40)), "40");
        assert_eq!(format!("{}", Value::Char("Smith".to_string())), "Smith");
    }
}
