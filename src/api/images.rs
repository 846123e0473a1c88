//! Image URL construction for catalog artwork

use std::fmt;

/// Default artwork host
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Size token understood by the image host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W92,
    W185,
    W300,
    W342,
    W500,
    W780,
    W1280,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W185 => "w185",
            ImageSize::W300 => "w300",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::Original => "original",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a full artwork URL from a relative path, against the default host.
///
/// Returns `None` when there is no path to build from.
pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    image_url_with_base(IMAGE_BASE_URL, path, size)
}

/// Same as [`image_url`] against a custom host
pub fn image_url_with_base(base: &str, path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{}/{}{}", base, size, path))
    } else {
        Some(format!("{}/{}/{}", base, size, path))
    }
}

/// Artwork host bound to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBase(String);

impl ImageBase {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        image_url_with_base(&self.0, path, size)
    }
}

impl Default for ImageBase {
    fn default() -> Self {
        Self::new(IMAGE_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_url() {
        assert_eq!(
            image_url(Some("/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg"), ImageSize::W500).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg")
        );
    }

    #[test]
    fn test_missing_path_is_none() {
        assert_eq!(image_url(None, ImageSize::W342), None);
        assert_eq!(image_url(Some(""), ImageSize::W342), None);
        assert_eq!(image_url(Some("   "), ImageSize::Original), None);
    }

    #[test]
    fn test_path_without_leading_slash() {
        assert_eq!(
            image_url_with_base("http://img/", Some("abc.jpg"), ImageSize::Original).as_deref(),
            Some("http://img/original/abc.jpg")
        );
    }

    #[test]
    fn test_image_base() {
        let base = ImageBase::new("http://localhost:1234/t/p");
        assert_eq!(
            base.url(Some("/p.jpg"), ImageSize::W92).as_deref(),
            Some("http://localhost:1234/t/p/w92/p.jpg")
        );
        assert_eq!(ImageBase::default().as_str(), IMAGE_BASE_URL);
    }
}
