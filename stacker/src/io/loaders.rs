use anyhow::{Context, Result};
use std::path::Path;

use crate::core::domain::LightCurve;
use crate::parsing::lightcurve_parser;
use crate::parsing::reference_epochs_parser;
use crate::time::ReferenceEpochs;

/// Represents the encoding of a reference epoch file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceEpochFormat {
    Npy,
    Json,
    Text,
}

impl ReferenceEpochFormat {
    /// Detect the encoding from the file extension
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("npy") => Self::Npy,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Loads light curve tables
pub struct LightCurveLoader;

impl LightCurveLoader {
    /// Load a light curve from a file
    pub fn load_from_file(path: &Path) -> Result<LightCurve> {
        lightcurve_parser::parse_lightcurve_file(path)
            .with_context(|| format!("Failed to parse light curve: {}", path.display()))
    }

    /// Load a light curve from an in-memory table
    pub fn load_from_str(content: &str) -> Result<LightCurve> {
        lightcurve_parser::parse_lightcurve_str(content)
            .context("Failed to parse light curve string")
    }
}

/// Loads reference epoch sets
pub struct ReferenceEpochLoader;

impl ReferenceEpochLoader {
    /// Load reference epochs from a file (auto-detects `.npy`, JSON or text)
    pub fn load_from_file(path: &Path) -> Result<ReferenceEpochs> {
        let format = ReferenceEpochFormat::from_path(path);
        let read_error = || format!("Failed to read reference epochs file: {}", path.display());

        let epochs = match format {
            ReferenceEpochFormat::Npy => {
                let bytes = std::fs::read(path).with_context(read_error)?;
                reference_epochs_parser::parse_reference_epochs_npy(&bytes)
            }
            ReferenceEpochFormat::Json => {
                let content = std::fs::read_to_string(path).with_context(read_error)?;
                reference_epochs_parser::parse_reference_epochs_json(&content)
            }
            ReferenceEpochFormat::Text => {
                let content = std::fs::read_to_string(path).with_context(read_error)?;
                reference_epochs_parser::parse_reference_epochs_text(&content)
            }
        }
        .with_context(|| format!("Failed to load reference epochs ({:?})", format))?;

        log::info!(
            "Loaded {} reference epochs from {}",
            epochs.len(),
            path.display()
        );
        Ok(epochs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_file(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ReferenceEpochFormat::from_path(Path::new("new_moons.npy")),
            ReferenceEpochFormat::Npy
        );
        assert_eq!(
            ReferenceEpochFormat::from_path(Path::new("moons.JSON")),
            ReferenceEpochFormat::Json
        );
        assert_eq!(
            ReferenceEpochFormat::from_path(Path::new("moons.txt")),
            ReferenceEpochFormat::Text
        );
        assert_eq!(
            ReferenceEpochFormat::from_path(Path::new("moons")),
            ReferenceEpochFormat::Text
        );
    }

    #[test]
    fn test_load_from_str() {
        let lc = LightCurveLoader::load_from_str("MJD uJy duJy F RA Dec\n58400 1 1 o 0 0\n")
            .unwrap();
        assert_eq!(lc.len(), 1);
    }

    #[test]
    fn test_load_reference_epochs_by_extension() {
        let text = temp_file(".txt", b"58400.0\n58429.5\n");
        let epochs = ReferenceEpochLoader::load_from_file(text.path()).unwrap();
        assert_eq!(epochs.as_slice(), &[58400.0, 58429.5]);

        let json = temp_file(".json", br#"{"new_moons": [58459.0, 58429.5]}"#);
        let epochs = ReferenceEpochLoader::load_from_file(json.path()).unwrap();
        assert_eq!(epochs.as_slice(), &[58429.5, 58459.0]);

        let mut header = "{'descr': '<f8', 'fortran_order': False, 'shape': (1,), }".to_string();
        while (10 + header.len() + 1) % 64 != 0 {
            header.push(' ');
        }
        header.push('\n');
        let mut npy = b"\x93NUMPY\x01\x00".to_vec();
        npy.extend_from_slice(&(header.len() as u16).to_le_bytes());
        npy.extend_from_slice(header.as_bytes());
        npy.extend_from_slice(&58488.5f64.to_le_bytes());
        let npy = temp_file(".npy", &npy);
        let epochs = ReferenceEpochLoader::load_from_file(npy.path()).unwrap();
        assert_eq!(epochs.as_slice(), &[58488.5]);

        // Text under a .npy name is not decoded as text
        let fake = temp_file(".npy", b"58400.0\n");
        assert!(ReferenceEpochLoader::load_from_file(fake.path()).is_err());
    }

    #[test]
    fn test_load_missing_reference_epochs() {
        let path = Path::new("/nonexistent/new_moons.json");
        let err = ReferenceEpochLoader::load_from_file(path).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("/nonexistent/new_moons.json"), "{}", msg);
    }
}
