//! Whitespace-delimited record codec shared by every node and edge type.
//!
//! A record is the part of a graph-file line after the type tag and the node
//! ids. Fields are read strictly in order and a token that does not parse is
//! an error. Running out of input ends the record: the fields read so far
//! are kept and the rest keep their previous values (see [`end_of_record`]).
//!
//! Floats are written with Rust's shortest round-trip formatting, so reading
//! back a written record reproduces every value bit for bit.

use crate::{io::IoError, manifold::se2::SE2};
use nalgebra::{Matrix3, Vector2, Vector3};
use std::{iter::Peekable, str::SplitWhitespace};
use tracing::debug;

/// Result type for record parsing.
pub type IoResult<T> = Result<T, IoError>;

/// Order in which the upper triangle of a 3x3 information matrix is stored.
pub const INFORMATION_UPPER_TRIANGLE: [(usize, usize); 6] =
    [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];

/// Accept a record that ended before all of its fields were read.
///
/// Only [`IoError::Truncated`] is absorbed; malformed tokens still fail.
pub fn end_of_record(result: IoResult<()>) -> IoResult<()> {
    match result {
        Err(IoError::Truncated { field }) => {
            debug!("record ended before field '{}', keeping defaults", field);
            Ok(())
        }
        other => other,
    }
}

/// Token reader over one record.
pub struct RecordReader<'a> {
    tokens: Peekable<SplitWhitespace<'a>>,
}

impl<'a> RecordReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace().peekable(),
        }
    }

    /// True once every token has been consumed.
    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    /// Tokens that were not consumed by the record.
    pub fn remaining(self) -> Vec<&'a str> {
        self.tokens.collect()
    }

    pub fn read_token(&mut self, field: &'static str) -> IoResult<&'a str> {
        self.tokens.next().ok_or(IoError::Truncated { field })
    }

    pub fn read_f64(&mut self, field: &'static str) -> IoResult<f64> {
        let token = self.read_token(field)?;
        token.parse::<f64>().map_err(|_| IoError::InvalidNumber {
            field,
            value: token.to_string(),
        })
    }

    pub fn read_i64(&mut self, field: &'static str) -> IoResult<i64> {
        let token = self.read_token(field)?;
        token.parse::<i64>().map_err(|_| IoError::InvalidInteger {
            field,
            value: token.to_string(),
        })
    }

    pub fn read_usize(&mut self, field: &'static str) -> IoResult<usize> {
        let token = self.read_token(field)?;
        token.parse::<usize>().map_err(|_| IoError::InvalidInteger {
            field,
            value: token.to_string(),
        })
    }

    /// Read a pose-vector axis index (0, 1 or 2).
    pub fn read_axis(&mut self, field: &'static str) -> IoResult<usize> {
        let token = self.read_token(field)?;
        match token.parse::<usize>() {
            Ok(axis) if axis < 3 => Ok(axis),
            _ => Err(IoError::InvalidInteger {
                field,
                value: token.to_string(),
            }),
        }
    }

    pub fn read_vector2(&mut self, field: &'static str) -> IoResult<Vector2<f64>> {
        Ok(Vector2::new(self.read_f64(field)?, self.read_f64(field)?))
    }

    pub fn read_vector3(&mut self, field: &'static str) -> IoResult<Vector3<f64>> {
        Ok(Vector3::new(
            self.read_f64(field)?,
            self.read_f64(field)?,
            self.read_f64(field)?,
        ))
    }

    /// Read an `x y θ` triple as a rigid transform.
    pub fn read_se2(&mut self, field: &'static str) -> IoResult<SE2> {
        self.read_vector3(field).map(|v| SE2::from_vector(&v))
    }

    /// Read the six upper-triangle entries and mirror them into a symmetric matrix.
    pub fn read_information(&mut self) -> IoResult<Matrix3<f64>> {
        let mut information = Matrix3::zeros();
        for (i, j) in INFORMATION_UPPER_TRIANGLE {
            let value = self.read_f64("information")?;
            information[(i, j)] = value;
            information[(j, i)] = value;
        }
        Ok(information)
    }
}

/// Builds one record, single-space separated.
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    buffer: String,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_token(&mut self, token: &str) -> &mut Self {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(token);
        self
    }

    pub fn write_f64(&mut self, value: f64) -> &mut Self {
        self.write_token(&value.to_string())
    }

    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.write_token(&value.to_string())
    }

    pub fn write_usize(&mut self, value: usize) -> &mut Self {
        self.write_token(&value.to_string())
    }

    pub fn write_vector2(&mut self, value: &Vector2<f64>) -> &mut Self {
        for v in value.iter() {
            self.write_f64(*v);
        }
        self
    }

    pub fn write_vector3(&mut self, value: &Vector3<f64>) -> &mut Self {
        for v in value.iter() {
            self.write_f64(*v);
        }
        self
    }

    pub fn write_se2(&mut self, value: &SE2) -> &mut Self {
        self.write_vector3(&value.to_vector())
    }

    /// Write the upper triangle of `information`, row-major.
    pub fn write_information(&mut self, information: &Matrix3<f64>) -> &mut Self {
        for (i, j) in INFORMATION_UPPER_TRIANGLE {
            self.write_f64(information[(i, j)]);
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fields_in_order() -> Result<(), IoError> {
        let mut reader = RecordReader::new("1.5 -2 0.25 BIAS 2");
        let v = reader.read_vector3("measurement")?;
        assert_eq!(v, Vector3::new(1.5, -2.0, 0.25));
        assert_eq!(reader.read_token("interpretation")?, "BIAS");
        assert_eq!(reader.read_axis("axis")?, 2);
        assert!(reader.is_exhausted());
        Ok(())
    }

    #[test]
    fn test_missing_field_is_truncated() {
        let mut reader = RecordReader::new("1.0 2.0");
        let result = reader.read_vector3("measurement");
        assert!(matches!(
            result,
            Err(IoError::Truncated {
                field: "measurement"
            })
        ));
    }

    #[test]
    fn test_end_of_record_accepts_truncation_only() {
        let mut reader = RecordReader::new("1.0 2.0");
        assert!(end_of_record(reader.read_vector3("measurement").map(|_| ())).is_ok());

        let mut reader = RecordReader::new("1.0 x 2.0");
        assert!(matches!(
            end_of_record(reader.read_vector3("measurement").map(|_| ())),
            Err(IoError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_non_numeric_token() {
        let mut reader = RecordReader::new("1.0 abc 3.0");
        let result = reader.read_vector3("measurement");
        assert!(matches!(result, Err(IoError::InvalidNumber { value, .. }) if value == "abc"));

        let mut reader = RecordReader::new("1.5");
        assert!(matches!(
            reader.read_i64("multiplier"),
            Err(IoError::InvalidInteger { .. })
        ));

        let mut reader = RecordReader::new("3");
        assert!(matches!(
            reader.read_axis("axis"),
            Err(IoError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn test_information_is_mirrored() -> Result<(), IoError> {
        let mut reader = RecordReader::new("1 2 3 4 5 6");
        let information = reader.read_information()?;
        assert_eq!(information, Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 5.0, 3.0, 5.0, 6.0));
        assert_eq!(information, information.transpose());
        Ok(())
    }

    #[test]
    fn test_write_mirrors_read() -> Result<(), IoError> {
        let information = Matrix3::new(10.0, 0.5, 0.25, 0.5, 20.0, 0.125, 0.25, 0.125, 30.0);
        let measurement = Vector3::new(0.1, -0.7, 1.0 / 3.0);

        let mut writer = RecordWriter::new();
        writer
            .write_vector3(&measurement)
            .write_token("SCALE")
            .write_usize(1)
            .write_information(&information);
        let record = writer.into_string();

        assert!(!record.starts_with(' '));
        assert!(!record.ends_with(' '));
        assert!(!record.contains("  "));

        let mut reader = RecordReader::new(&record);
        assert_eq!(reader.read_vector3("measurement")?, measurement);
        assert_eq!(reader.read_token("interpretation")?, "SCALE");
        assert_eq!(reader.read_axis("axis")?, 1);
        assert_eq!(reader.read_information()?, information);
        assert!(reader.is_exhausted());
        Ok(())
    }

    #[test]
    fn test_remaining_tokens() {
        let mut reader = RecordReader::new("1 2 extra tokens");
        assert!(reader.read_vector2("value").is_ok());
        assert_eq!(reader.remaining(), vec!["extra", "tokens"]);
    }
}
