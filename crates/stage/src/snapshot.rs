//! CPU-side PNG snapshot of a recorded frame.
//!
//! Feature-gated behind `png` (default on) so the WASM host can depend on the
//! stage without pulling in the `image` crate. The rasterizer itself lives in
//! [`crate::pixel`] (always available).

use crate::pixel::frame_to_rgba;
use crate::recorder::Recorder;
use std::path::Path;
use tidemark_core::color::Srgb;
use tidemark_core::error::EngineError;

/// Writes `frame` as a `size × size` PNG over `background`.
///
/// Returns `EngineError::InvalidParam` for a zero size, or `EngineError::Io`
/// on write failure.
pub fn write_png(
    frame: &Recorder,
    size: u32,
    background: Srgb,
    path: &Path,
) -> Result<(), EngineError> {
    if size == 0 {
        return Err(EngineError::InvalidParam {
            name: "size".into(),
            reason: "snapshot size must be at least 1 pixel".into(),
        });
    }
    let rgba = frame_to_rgba(frame, size, background);
    let img = image::RgbaImage::from_raw(size, size, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    log::debug!("wrote {size}x{size} snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_core::sink::RenderSink;

    #[test]
    fn write_png_round_trip() {
        let mut frame = Recorder::default();
        frame.draw_particle(0, 500.0, 500.0, Srgb::WHITE, 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&frame, 64, Srgb::from_hex("#112240").unwrap(), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 64);
        assert_eq!(img.get_pixel(32, 32).0, [255, 255, 255, 255]);
    }

    #[test]
    fn zero_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(&Recorder::default(), 0, Srgb::WHITE, &dir.path().join("x.png"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParam { .. }));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let err = write_png(&Recorder::default(), 8, Srgb::WHITE, &path).unwrap_err();
        assert_eq!(err.category(), tidemark_core::ErrorCategory::Io);
    }
}
