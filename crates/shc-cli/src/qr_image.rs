//! # QR Image Reading
//!
//! Finds and decodes the QR code in an image file. Any format the `image`
//! crate is built with (PNG, JPEG, BMP) is accepted. The image is reduced
//! to 8-bit greyscale before detection.
//!
//! A card image must contain exactly one QR code. Chunked cards are read
//! one image per chunk.

use std::path::{Path, PathBuf};

use image::GrayImage;

/// Errors from reading a QR code out of an image.
#[derive(Debug, thiserror::Error)]
pub enum QrImageError {
    /// The file could not be opened or decoded as an image.
    #[error("failed to read image {path}: {source}")]
    Open {
        /// The image file.
        path: PathBuf,
        /// The decoding failure.
        source: image::ImageError,
    },
    /// No QR code was found.
    #[error("no QR code found in {0} - send an image with one")]
    NoQrCode(PathBuf),
    /// More than one QR code was found.
    #[error("{count} QR codes found in {path} - send an image with just one")]
    TooManyQrCodes {
        /// The image file.
        path: PathBuf,
        /// Number of codes detected.
        count: usize,
    },
    /// A QR code was located but its data could not be decoded.
    #[error("unreadable QR code in {path}: {reason}")]
    Unreadable {
        /// The image file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
}

/// Decode every QR code found in a greyscale image, in detection order.
pub fn decode_qr_codes(img: &GrayImage) -> Vec<Result<String, String>> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32).0[0],
    );
    prepared
        .detect_grids()
        .into_iter()
        .map(|grid| {
            grid.decode()
                .map(|(_, content)| content)
                .map_err(|e| format!("{e:?}"))
        })
        .collect()
}

/// Read the text of the single QR code in an image file.
pub fn read_qr_text(path: &Path) -> Result<String, QrImageError> {
    let img = image::open(path)
        .map_err(|source| QrImageError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();

    let mut codes = decode_qr_codes(&img);
    tracing::debug!(path = %path.display(), found = codes.len(), "scanned image for QR codes");
    match codes.len() {
        0 => Err(QrImageError::NoQrCode(path.to_path_buf())),
        1 => codes.remove(0).map_err(|reason| QrImageError::Unreadable {
            path: path.to_path_buf(),
            reason,
        }),
        count => Err(QrImageError::TooManyQrCodes {
            path: path.to_path_buf(),
            count,
        }),
    }
}
