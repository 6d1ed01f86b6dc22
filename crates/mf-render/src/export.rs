//! Handing a finished canvas to the outside world: PNG bytes, a file on
//! disk, or the platform share sheet.

use crate::error::RenderError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "meme.png";
pub const SHARE_TITLE: &str = "Check out my meme!";

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Write `image` as PNG to `path`, creating parent directories.
pub fn download(image: &RgbaImage, path: &Path) -> Result<PathBuf, RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, e))?;
    }
    let png = encode_png(image)?;
    std::fs::write(path, png).map_err(|e| RenderError::io(path, e))?;
    log::debug!("wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// A native share target.
pub trait ShareSheet {
    fn is_available(&self) -> bool;
    fn share(&self, png: &[u8], file_name: &str, title: &str) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// No usable share sheet; the PNG was written here and opened locally.
    OpenedLocally(PathBuf),
}

/// Share through `sheet`, falling back to opening the PNG with the OS viewer.
pub fn share(
    image: &RgbaImage,
    sheet: Option<&dyn ShareSheet>,
    fallback_dir: &Path,
) -> Result<ShareOutcome, RenderError> {
    share_with(image, sheet, fallback_dir, |path| open::that(path))
}

/// [`share`] with an injectable opener for the fallback path.
pub fn share_with<F>(
    image: &RgbaImage,
    sheet: Option<&dyn ShareSheet>,
    fallback_dir: &Path,
    opener: F,
) -> Result<ShareOutcome, RenderError>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let png = encode_png(image)?;
    if let Some(sheet) = sheet.filter(|s| s.is_available()) {
        match sheet.share(&png, DEFAULT_FILE_NAME, SHARE_TITLE) {
            Ok(()) => return Ok(ShareOutcome::Shared),
            Err(e) => log::warn!("share sheet failed, opening locally: {e}"),
        }
    }

    std::fs::create_dir_all(fallback_dir).map_err(|e| RenderError::io(fallback_dir, e))?;
    let path = fallback_dir.join(DEFAULT_FILE_NAME);
    std::fs::write(&path, &png).map_err(|e| RenderError::io(&path, e))?;
    opener(&path).map_err(|e| RenderError::Share(format!("could not open {}: {e}", path.display())))?;
    Ok(ShareOutcome::OpenedLocally(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct Sheet {
        available: bool,
        fail: bool,
        shared: RefCell<Vec<usize>>,
    }

    impl ShareSheet for Sheet {
        fn is_available(&self) -> bool {
            self.available
        }

        fn share(&self, png: &[u8], _file_name: &str, _title: &str) -> Result<(), RenderError> {
            if self.fail {
                return Err(RenderError::Share("cancelled".into()));
            }
            self.shared.borrow_mut().push(png.len());
            Ok(())
        }
    }

    fn sheet(available: bool, fail: bool) -> Sheet {
        Sheet {
            available,
            fail,
            shared: RefCell::new(Vec::new()),
        }
    }

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255]))
    }

    #[test]
    fn png_starts_with_signature() {
        let png = encode_png(&canvas()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn download_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/meme.png");
        download(&canvas(), &path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back, canvas());
    }

    #[test]
    fn available_sheet_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let s = sheet(true, false);
        let outcome = share_with(&canvas(), Some(&s as &dyn ShareSheet), dir.path(), |_| {
            panic!("fallback must not run")
        })
        .unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);
        assert_eq!(s.shared.borrow().len(), 1);
    }

    #[test]
    fn falls_back_when_unavailable_or_failing() {
        for s in [sheet(false, false), sheet(true, true)] {
            let dir = tempfile::tempdir().unwrap();
            let opened = RefCell::new(None);
            let outcome = share_with(&canvas(), Some(&s as &dyn ShareSheet), dir.path(), |p| {
                *opened.borrow_mut() = Some(p.to_path_buf());
                Ok(())
            })
            .unwrap();
            let expected = dir.path().join(DEFAULT_FILE_NAME);
            assert_eq!(outcome, ShareOutcome::OpenedLocally(expected.clone()));
            assert_eq!(opened.into_inner(), Some(expected.clone()));
            assert!(expected.exists());
        }
    }
}
