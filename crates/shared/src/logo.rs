use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;

/// Header logos are drawn this wide; height follows the aspect ratio.
pub const LOGO_WIDTH_PT: u64 = 50;
const EMU_PER_PT: u64 = 12_700;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// A logo re-encoded as PNG and sized for the document header
#[derive(Debug, Clone)]
pub struct HeaderImage {
    pub png: Vec<u8>,
    pub width_emu: u64,
    pub height_emu: u64,
}

impl HeaderImage {
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|source| ImageError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode any supported format and re-encode it as PNG
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let width_emu = LOGO_WIDTH_PT * EMU_PER_PT;
        let height_emu = if img.width() == 0 {
            width_emu
        } else {
            width_emu * u64::from(img.height()) / u64::from(img.width())
        };

        Ok(Self {
            png,
            width_emu,
            height_emu,
        })
    }
}

/// Load up to two header logos, one slot per path.
///
/// A logo that fails leaves its slot empty and is reported, so the other
/// logo keeps its position in the header.
pub fn load_header_images(paths: &[PathBuf]) -> (Vec<Option<HeaderImage>>, Vec<ImageError>) {
    let mut slots = Vec::new();
    let mut failures = Vec::new();

    for path in paths.iter().take(2) {
        match HeaderImage::load(path) {
            Ok(image) => slots.push(Some(image)),
            Err(e) => {
                tracing::debug!(error = %e, "skipping header image");
                failures.push(e);
                slots.push(None);
            }
        }
    }

    (slots, failures)
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}
