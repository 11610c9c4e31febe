//! Plain-text storage of similarity transforms.
//!
//! The format is the 3x4 matrix written row by row: three lines of four
//! space-separated values, each with 17 significant digits so that reading a
//! file back reproduces the matrix bit for bit.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use nalgebra::Matrix3x4;

use crate::error::PersistenceError;
use crate::similarity_transform::SimilarityTransform3;

const NUM_VALUES: usize = 12;
const SIGNIFICANT_DIGITS: i32 = 17;

/// Format like C's `%.17g`: shortest of fixed and exponent notation with 17
/// significant digits, trailing zeros removed.
pub fn format_significant(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_owned()
        } else if value > 0.0 {
            "inf".to_owned()
        } else {
            "-inf".to_owned()
        };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    // Exponent after rounding to the requested precision.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_owned()
    }
}

fn strip_trailing_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Write the matrix of `transform` as three lines of four values.
pub fn write_transform<W: Write>(
    transform: &SimilarityTransform3,
    mut writer: W,
) -> Result<(), PersistenceError> {
    let matrix = transform.matrix();
    for row in matrix.row_iter() {
        let line = row
            .iter()
            .map(|v| format_significant(*v))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}").map_err(PersistenceError::Write)?;
    }
    writer.flush().map_err(PersistenceError::Write)
}

/// Read twelve whitespace-separated values in row-major order.
///
/// Anything after the twelfth value is ignored.
pub fn read_transform<R: Read>(mut reader: R) -> Result<SimilarityTransform3, PersistenceError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(PersistenceError::Read)?;

    let mut values = [0.0; NUM_VALUES];
    let mut found = 0;
    for (index, token) in text.split_whitespace().take(NUM_VALUES).enumerate() {
        values[index] = token
            .parse::<f64>()
            .map_err(|source| PersistenceError::Parse {
                index,
                token: token.to_owned(),
                source,
            })?;
        found += 1;
    }
    if found < NUM_VALUES {
        return Err(PersistenceError::MissingValues {
            expected: NUM_VALUES,
            found,
        });
    }
    Ok(SimilarityTransform3::from_matrix(Matrix3x4::from_row_slice(
        &values,
    )))
}

impl SimilarityTransform3 {
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), PersistenceError> {
        write_transform(self, writer)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, PersistenceError> {
        read_transform(reader)
    }

    /// Write to `path`, truncating any existing file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| PersistenceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        write_transform(self, BufWriter::new(file))?;
        debug!("wrote similarity transform to {}", path.display());
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PersistenceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let transform = read_transform(file)?;
        debug!("read similarity transform from {}", path.display());
        Ok(transform)
    }
}
