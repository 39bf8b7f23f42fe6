use anyhow::{bail, ensure, Context, Result};
use serde_json::Value;

use crate::time::{parse_iso_to_mjd, ReferenceEpochs};

/// Candidate keys that may contain the list of reference epochs in the JSON payload
const EPOCH_KEYS: &[&str] = &[
    "new_moons",
    "newMoons",
    "reference_epochs",
    "referenceEpochs",
    "epochs",
    "mjd",
];

/// Candidate keys for the timestamp inside an epoch object
const VALUE_KEYS: &[&str] = &["value", "mjd", "MJD"];

const NPY_MAGIC: &[u8] = b"\x93NUMPY";

/// Parse reference epochs from a JSON string
pub fn parse_reference_epochs_json(json_str: &str) -> Result<ReferenceEpochs> {
    let value: Value =
        serde_json::from_str(json_str).context("Failed to parse reference epochs JSON")?;

    let raw_epochs =
        find_epochs_array(&value).context("Could not find reference epochs array in JSON")?;

    let epochs = raw_epochs
        .iter()
        .enumerate()
        .map(|(i, v)| {
            parse_epoch_value(v).with_context(|| format!("Invalid reference epoch at index {}", i))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(ReferenceEpochs::new(epochs))
}

/// Parse reference epochs from whitespace- or comma-separated text
///
/// Everything after a `#` on a line is ignored.
pub fn parse_reference_epochs_text(content: &str) -> Result<ReferenceEpochs> {
    let mut epochs = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let data = line.split('#').next().unwrap_or_default();
        for token in data
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let mjd: f64 = token.parse().with_context(|| {
                format!("Invalid reference epoch '{}' on line {}", token, line_no + 1)
            })?;
            epochs.push(mjd);
        }
    }
    Ok(ReferenceEpochs::new(epochs))
}

/// Parse reference epochs from the bytes of a one-dimensional `.npy` array
///
/// Supports format versions 1 to 3 with `f8`, `f4`, `i8` or `i4` data in
/// either byte order.
pub fn parse_reference_epochs_npy(bytes: &[u8]) -> Result<ReferenceEpochs> {
    ensure!(
        bytes.len() >= 10 && bytes.starts_with(NPY_MAGIC),
        "Not a NumPy .npy file"
    );

    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            ensure!(bytes.len() >= 12, "Truncated .npy header");
            (
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
                12,
            )
        }
        v => bail!("Unsupported .npy format version {}", v),
    };

    let data_start = header_start + header_len;
    ensure!(bytes.len() >= data_start, "Truncated .npy header");
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .context("Invalid .npy header encoding")?;

    ensure!(
        !header.contains("'fortran_order': True"),
        "Fortran-ordered .npy arrays are not supported"
    );
    let descr = header_field(header, "descr").context("Missing 'descr' in .npy header")?;
    let dtype = NpyDtype::parse(&descr)?;

    let shape = header_shape(header).context("Missing or invalid 'shape' in .npy header")?;
    ensure!(
        shape.len() == 1,
        "Expected a one-dimensional .npy array, got shape {:?}",
        shape
    );

    let data = &bytes[data_start..];
    let expected = shape[0] * dtype.size;
    ensure!(
        data.len() == expected,
        "Expected {} bytes of .npy data, found {}",
        expected,
        data.len()
    );

    let epochs = data.chunks_exact(dtype.size).map(|c| dtype.decode(c)).collect();
    Ok(ReferenceEpochs::new(epochs))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NpyKind {
    Float,
    Int,
}

/// Element type of a `.npy` array
#[derive(Debug, Clone, Copy)]
struct NpyDtype {
    kind: NpyKind,
    size: usize,
    big_endian: bool,
}

impl NpyDtype {
    fn parse(descr: &str) -> Result<Self> {
        let mut chars = descr.chars();
        let big_endian = match chars.next() {
            Some('<' | '=' | '|') => false,
            Some('>') => true,
            _ => bail!("Unsupported .npy dtype {}", descr),
        };
        let code = chars.as_str();
        let (kind, size) = match code {
            "f8" => (NpyKind::Float, 8),
            "f4" => (NpyKind::Float, 4),
            "i8" => (NpyKind::Int, 8),
            "i4" => (NpyKind::Int, 4),
            _ => bail!("Unsupported .npy dtype {}", descr),
        };
        Ok(Self {
            kind,
            size,
            big_endian,
        })
    }

    fn decode(&self, chunk: &[u8]) -> f64 {
        let mut buf = [0u8; 8];
        buf[..self.size].copy_from_slice(chunk);
        if self.big_endian {
            buf[..self.size].reverse();
        }
        let low = [buf[0], buf[1], buf[2], buf[3]];
        match (self.kind, self.size) {
            (NpyKind::Float, 8) => f64::from_le_bytes(buf),
            (NpyKind::Float, _) => f64::from(f32::from_le_bytes(low)),
            (NpyKind::Int, 8) => i64::from_le_bytes(buf) as f64,
            (NpyKind::Int, _) => f64::from(i32::from_le_bytes(low)),
        }
    }
}

/// Extract a quoted string field from a `.npy` header dictionary
fn header_field(header: &str, key: &str) -> Option<String> {
    let key_pos = header.find(&format!("'{}'", key))?;
    let rest = &header[key_pos + key.len() + 2..];
    let open = rest.find('\'')?;
    let value = &rest[open + 1..];
    let close = value.find('\'')?;
    Some(value[..close].to_string())
}

/// Extract the `shape` tuple from a `.npy` header dictionary
fn header_shape(header: &str) -> Option<Vec<usize>> {
    let key_pos = header.find("'shape'")?;
    let rest = &header[key_pos..];
    let open = rest.find('(')?;
    let close = rest[open..].find(')')? + open;
    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.parse().ok())
        .collect()
}

/// Find the array of epochs in the JSON payload
fn find_epochs_array(payload: &Value) -> Option<&Vec<Value>> {
    if let Some(arr) = payload.as_array() {
        return Some(arr);
    }

    let obj = payload.as_object()?;
    for key in EPOCH_KEYS {
        if let Some(arr) = obj.get(*key).and_then(Value::as_array) {
            return Some(arr);
        }
    }

    // Fallback: first array value in the object
    obj.values().find_map(Value::as_array)
}

/// Parse a single epoch from a number, a string or a nested object
fn parse_epoch_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| parse_iso_to_mjd(s)),
        Value::Object(obj) => VALUE_KEYS
            .iter()
            .find_map(|key| obj.get(*key))
            .and_then(parse_epoch_value),
        _ => None,
    }
}
