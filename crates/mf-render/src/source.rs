//! Base image loading.
//!
//! Resolves an [`ImageRef`] into decoded pixels. Inline references are
//! handled locally (`data:` decoded in place, `file:` read from disk),
//! absolute `http(s)` URLs go through an injected [`RemoteFetch`], and
//! relative paths are joined onto the configured [`AssetBase`].
//!
//! Every failure is an explicit [`RenderError`]; there is no placeholder
//! image.

use crate::error::RenderError;
use base64::{Engine as _, engine::general_purpose};
use image::DynamicImage;
use mf_core::image_ref::join_url;
use mf_core::{ImageRef, ImageUrlKind, hex_val};
use std::path::{Path, PathBuf};
use winnow::ascii::Caseless;
use winnow::combinator::{preceded, repeat};
use winnow::prelude::*;
use winnow::token::{rest, take_till};

/// Fetches bytes for absolute `http(s)` URLs.
pub trait RemoteFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError>;
}

/// Where relative image paths live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetBase {
    Dir(PathBuf),
    Url(String),
}

impl AssetBase {
    /// `http(s)://…` becomes a URL base, anything else a directory.
    pub fn parse(base: &str) -> Self {
        let trimmed = base.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            AssetBase::Url(trimmed.to_string())
        } else if lower.starts_with("file:") {
            AssetBase::Dir(PathBuf::from(file_url_path(trimmed)))
        } else {
            AssetBase::Dir(PathBuf::from(trimmed))
        }
    }
}

#[derive(Default)]
pub struct ImageLoader {
    asset_base: Option<AssetBase>,
    fetcher: Option<Box<dyn RemoteFetch>>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("asset_base", &self.asset_base)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl ImageLoader {
    pub fn new(asset_base: Option<AssetBase>) -> Self {
        Self {
            asset_base,
            fetcher: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn RemoteFetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn set_fetcher(&mut self, fetcher: Box<dyn RemoteFetch>) {
        self.fetcher = Some(fetcher);
    }

    pub fn asset_base(&self) -> Option<&AssetBase> {
        self.asset_base.as_ref()
    }

    /// Load and decode.
    pub fn load(&self, image: &ImageRef) -> Result<DynamicImage, RenderError> {
        let bytes = self.load_bytes(image)?;
        let decoded = image::load_from_memory(&bytes)?;
        log::debug!(
            "decoded {image:?}: {}x{}",
            decoded.width(),
            decoded.height()
        );
        Ok(decoded)
    }

    /// Raw (still encoded) bytes behind a reference.
    pub fn load_bytes(&self, image: &ImageRef) -> Result<Vec<u8>, RenderError> {
        let url = image.as_str().trim();
        match image.kind() {
            ImageUrlKind::Inline => self.load_inline(url),
            ImageUrlKind::Absolute => self.fetch(url),
            ImageUrlKind::Relative => self.load_relative(url),
        }
    }

    fn load_inline(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("data:") {
            decode_data_url(url)
        } else if lower.starts_with("file:") {
            read_file(Path::new(&file_url_path(url)))
        } else {
            Err(RenderError::Unsupported(format!(
                "{} only resolves inside the browser that created it",
                url.split_once(':').map_or(url, |(scheme, _)| scheme)
            )))
        }
    }

    fn load_relative(&self, path: &str) -> Result<Vec<u8>, RenderError> {
        if path.is_empty() {
            return Err(RenderError::Unsupported("empty image reference".into()));
        }
        match &self.asset_base {
            Some(AssetBase::Url(base)) => self.fetch(&join_url(base, path)),
            Some(AssetBase::Dir(dir)) => {
                let relative = path.trim_start_matches("./").trim_start_matches('/');
                read_file(&dir.join(relative))
            }
            None => read_file(Path::new(path)),
        }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| RenderError::MissingFetcher(url.to_string()))?;
        log::debug!("fetching {url}");
        fetcher.fetch(url)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, RenderError> {
    log::debug!("reading {}", path.display());
    std::fs::read(path).map_err(|e| RenderError::io(path, e))
}

// ─── data: / file: URLs ──────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct DataUrl<'a> {
    media_type: &'a str,
    base64: bool,
    payload: &'a str,
}

fn data_url<'a>(input: &mut &'a str) -> ModalResult<DataUrl<'a>> {
    let _ = Caseless("data:").parse_next(input)?;
    let media_type: &str = take_till(0.., |c: char| c == ';' || c == ',').parse_next(input)?;
    let params: Vec<&str> =
        repeat(0.., preceded(';', take_till(0.., |c: char| c == ';' || c == ','))).parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let payload: &str = rest.parse_next(input)?;
    Ok(DataUrl {
        media_type,
        base64: params.iter().any(|p| p.eq_ignore_ascii_case("base64")),
        payload,
    })
}

/// Decode the payload of a `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, RenderError> {
    let parsed = data_url
        .parse(url)
        .map_err(|_| RenderError::MalformedDataUrl("expected data:[<type>][;base64],<data>".into()))?;
    log::trace!("data URL: {:?}, base64={}", parsed.media_type, parsed.base64);
    if parsed.base64 {
        let compact: String = percent_decode_lossy(parsed.payload)
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(char::from)
            .collect();
        general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| RenderError::MalformedDataUrl(e.to_string()))
    } else {
        Ok(percent_decode_lossy(parsed.payload))
    }
}

/// `%XX` decoding. Malformed escapes are kept verbatim.
fn percent_decode_lossy(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// Filesystem path of a `file:` URL (`file:///tmp/a.png` → `/tmp/a.png`).
fn file_url_path(url: &str) -> String {
    let without_scheme = &url["file:".len()..];
    let path = match without_scheme.strip_prefix("//") {
        Some(authority_and_path) => {
            let host_end = authority_and_path.find('/').unwrap_or(authority_and_path.len());
            &authority_and_path[host_end..]
        }
        None => without_scheme,
    };
    String::from_utf8_lossy(&percent_decode_lossy(path)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_data_url_parts() {
        let parsed = data_url.parse("data:image/png;charset=x;base64,AAAA").unwrap();
        assert_eq!(
            parsed,
            DataUrl {
                media_type: "image/png",
                base64: true,
                payload: "AAAA",
            }
        );
        let plain = data_url.parse("data:,Hello%2C%20World").unwrap();
        assert_eq!(plain.media_type, "");
        assert!(!plain.base64);
    }

    #[test]
    fn decodes_both_encodings() {
        assert_eq!(decode_data_url("data:text/plain;base64,aGk=").unwrap(), b"hi");
        assert_eq!(decode_data_url("data:,a%20b").unwrap(), b"a b");
    }

    #[test]
    fn rejects_missing_comma() {
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(RenderError::MalformedDataUrl(_))
        ));
    }

    #[test]
    fn file_urls_map_to_paths() {
        assert_eq!(file_url_path("file:///tmp/a%20b.png"), "/tmp/a b.png");
        assert_eq!(file_url_path("file://localhost/tmp/a.png"), "/tmp/a.png");
        assert_eq!(file_url_path("file:/tmp/a.png"), "/tmp/a.png");
    }

    #[test]
    fn asset_base_kinds() {
        assert_eq!(
            AssetBase::parse("https://cdn.example/"),
            AssetBase::Url("https://cdn.example/".into())
        );
        assert_eq!(AssetBase::parse("./assets"), AssetBase::Dir(PathBuf::from("./assets")));
    }

    #[test]
    fn blob_urls_are_unsupported() {
        let loader = ImageLoader::default();
        let err = loader.load_bytes(&ImageRef::from("blob:https://app/1234")).unwrap_err();
        assert!(matches!(err, RenderError::Unsupported(_)), "{err}");
    }

    #[test]
    fn absolute_urls_need_a_fetcher() {
        let loader = ImageLoader::default();
        let err = loader.load_bytes(&ImageRef::from("https://cdn/a.png")).unwrap_err();
        assert!(matches!(err, RenderError::MissingFetcher(url) if url == "https://cdn/a.png"));
    }

    #[test]
    fn relative_paths_go_through_url_base() {
        struct Echo;
        impl RemoteFetch for Echo {
            fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
                Ok(url.as_bytes().to_vec())
            }
        }
        let loader = ImageLoader::new(Some(AssetBase::parse("https://cdn.example/")))
            .with_fetcher(Box::new(Echo));
        let bytes = loader.load_bytes(&ImageRef::from("/templates/drake.jpg")).unwrap();
        assert_eq!(bytes, b"https://cdn.example/templates/drake.jpg");
    }
}
