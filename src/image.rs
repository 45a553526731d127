//! LC-3 object image loading.
//!
//! An image is a sequence of big-endian 16-bit words:
//! - word 0 is the origin address
//! - the remaining words are copied into memory starting at the origin
//!
//! Placement wraps past 0xFFFF. A trailing odd byte is ignored.

use crate::cpu::Memory;
use std::path::Path;
use thiserror::Error;

/// Where a loaded image landed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    /// First address written.
    pub origin: u16,
    /// Number of words written after the origin word.
    pub len: usize,
}

/// Decode an image from bytes and place it in memory.
pub fn load_image_bytes(mem: &mut Memory, bytes: &[u8]) -> Result<LoadedImage, ImageError> {
    let mut words = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    let origin = words.next().ok_or(ImageError::MissingOrigin)?;
    let contents: Vec<u16> = words.collect();
    mem.load(origin, &contents);

    Ok(LoadedImage { origin, len: contents.len() })
}

/// Load an image file from disk into memory.
pub fn load_image<P: AsRef<Path>>(mem: &mut Memory, path: P) -> Result<LoadedImage, ImageError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| ImageError::Io(e.to_string()))?;

    let image = load_image_bytes(mem, &bytes)?;
    log::info!(
        "loaded {}: {} words at {:#06x}",
        path.display(),
        image.len,
        image.origin
    );
    Ok(image)
}

/// Load every image in order. Stops at the first failure and reports
/// which path failed; later images overwrite earlier ones where they overlap.
pub fn load_images<P: AsRef<Path>>(mem: &mut Memory, paths: &[P]) -> Result<Vec<LoadedImage>, LoadError> {
    paths
        .iter()
        .map(|path| {
            load_image(mem, path).map_err(|source| LoadError {
                path: path.as_ref().display().to_string(),
                source,
            })
        })
        .collect()
}

/// Errors that can occur while decoding an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("image is shorter than its origin word")]
    MissingOrigin,
}

/// An [`ImageError`] tagged with the image path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load image: {path}: {source}")]
pub struct LoadError {
    pub path: String,
    #[source]
    pub source: ImageError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_big_endian() {
        let mut mem = Memory::new();
        let bytes = [0x30, 0x00, 0x12, 0x34, 0xF0, 0x25];

        let image = load_image_bytes(&mut mem, &bytes).unwrap();

        assert_eq!(image, LoadedImage { origin: 0x3000, len: 2 });
        assert_eq!(mem.read(0x3000), 0x1234);
        assert_eq!(mem.read(0x3001), 0xF025);
        assert_eq!(mem.read(0x3002), 0);
    }

    #[test]
    fn test_origin_only() {
        let mut mem = Memory::new();
        let image = load_image_bytes(&mut mem, &[0x40, 0x00]).unwrap();
        assert_eq!(image, LoadedImage { origin: 0x4000, len: 0 });
        assert_eq!(mem, Memory::new());
    }

    #[test]
    fn test_trailing_odd_byte_ignored() {
        let mut mem = Memory::new();
        let image = load_image_bytes(&mut mem, &[0x30, 0x00, 0xAB, 0xCD, 0xEF]).unwrap();
        assert_eq!(image.len, 1);
        assert_eq!(mem.read(0x3000), 0xABCD);
        assert_eq!(mem.read(0x3001), 0);
    }

    #[test]
    fn test_missing_origin() {
        let mut mem = Memory::new();
        assert_eq!(load_image_bytes(&mut mem, &[]), Err(ImageError::MissingOrigin));
        assert_eq!(load_image_bytes(&mut mem, &[0x30]), Err(ImageError::MissingOrigin));
    }

    #[test]
    fn test_wraps_past_top_of_memory() {
        let mut mem = Memory::new();
        load_image_bytes(&mut mem, &[0xFF, 0xFF, 0x00, 0x01, 0x00, 0x02]).unwrap();
        assert_eq!(mem.read(0xFFFF), 1);
        assert_eq!(mem.read(0x0000), 2);
    }

    #[test]
    fn test_missing_file_names_path() {
        let mut mem = Memory::new();
        let err = load_images(&mut mem, &["/nonexistent/dir/prog.obj"]).unwrap_err();

        assert_eq!(err.path, "/nonexistent/dir/prog.obj");
        assert!(matches!(err.source, ImageError::Io(_)));
        assert!(err.to_string().starts_with("failed to load image: /nonexistent/dir/prog.obj"));
    }
}
