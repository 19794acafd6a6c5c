//! Asset classification by source context and file extension

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Category of a discovered resource
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Html,
    Css,
    Js,
    Image,
    Font,
    /// Video and audio media
    Video,
    Other,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Html => "html",
            AssetCategory::Css => "css",
            AssetCategory::Js => "js",
            AssetCategory::Image => "image",
            AssetCategory::Font => "font",
            AssetCategory::Video => "video",
            AssetCategory::Other => "other",
        }
    }

    /// Classify from the file extension of the URL path
    ///
    /// Returns `Other` when there is no extension or it is not recognised.
    pub fn from_extension(url: &Url) -> Self {
        let Some(ext) = extension(url) else {
            return AssetCategory::Other;
        };
        match ext.as_str() {
            "html" | "htm" | "xhtml" | "shtml" | "php" | "asp" | "aspx" | "jsp" => {
                AssetCategory::Html
            }
            "css" => AssetCategory::Css,
            "js" | "mjs" | "cjs" => AssetCategory::Js,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" | "avif" | "tif"
            | "tiff" => AssetCategory::Image,
            "woff" | "woff2" | "ttf" | "otf" | "eot" => AssetCategory::Font,
            "mp4" | "webm" | "ogv" | "ogg" | "mov" | "m4v" | "avi" | "mkv" | "mp3" | "wav"
            | "m4a" | "aac" | "flac" | "oga" | "opus" => AssetCategory::Video,
            _ => AssetCategory::Other,
        }
    }

    /// Classify from a Content-Type header value
    pub fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if mime == "text/html" || mime == "application/xhtml+xml" {
            AssetCategory::Html
        } else if mime == "text/css" {
            AssetCategory::Css
        } else if mime.contains("javascript") || mime.contains("ecmascript") {
            AssetCategory::Js
        } else if mime.starts_with("image/") {
            AssetCategory::Image
        } else if mime.starts_with("font/") || mime.starts_with("application/font") {
            AssetCategory::Font
        } else if mime.starts_with("video/") || mime.starts_with("audio/") {
            AssetCategory::Video
        } else {
            AssetCategory::Other
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTML or CSS construct a reference was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// `<link rel="stylesheet">`
    LinkStylesheet,
    /// `<link rel="icon">` and friends
    LinkIcon,
    /// `<link rel="preload|prefetch|modulepreload" as="...">`
    LinkPreload { destination: Option<String> },
    /// Any other `<link href>`
    Link,
    Script,
    Img,
    ImgSrcset,
    /// `<source>` inside `<picture>`
    PictureSource,
    /// `<source>` inside `<video>` or `<audio>`
    MediaSource,
    Video,
    VideoPoster,
    Audio,
    Iframe,
    /// `style="..."` attribute
    InlineStyle,
    /// `<style>` element body
    StyleElement,
    Anchor,
    CssUrl,
    CssImport,
    CssFontFace,
}

/// Map a resolved URL and its source context to a category
///
/// Tag context wins; the extension only decides for ambiguous contexts.
/// Never fails: unknown combinations become `Other`.
pub fn classify(url: &Url, tag: &SourceTag) -> AssetCategory {
    let by_extension = AssetCategory::from_extension(url);
    let or_default = |default: AssetCategory| {
        if by_extension == AssetCategory::Other {
            default
        } else {
            by_extension
        }
    };

    match tag {
        SourceTag::LinkStylesheet => AssetCategory::Css,
        SourceTag::Script => AssetCategory::Js,
        SourceTag::Img
        | SourceTag::ImgSrcset
        | SourceTag::PictureSource
        | SourceTag::LinkIcon
        | SourceTag::VideoPoster => AssetCategory::Image,
        SourceTag::MediaSource | SourceTag::Video | SourceTag::Audio => AssetCategory::Video,
        SourceTag::CssFontFace => AssetCategory::Font,
        SourceTag::LinkPreload { destination } => match destination.as_deref() {
            Some("font") => AssetCategory::Font,
            Some("style") => AssetCategory::Css,
            Some("script") => AssetCategory::Js,
            Some("image") => AssetCategory::Image,
            Some("video") | Some("audio") | Some("track") => AssetCategory::Video,
            Some("document") => AssetCategory::Html,
            _ => by_extension,
        },
        SourceTag::Anchor | SourceTag::Iframe => or_default(AssetCategory::Html),
        SourceTag::CssImport => or_default(AssetCategory::Css),
        SourceTag::CssUrl | SourceTag::InlineStyle | SourceTag::StyleElement => {
            or_default(AssetCategory::Image)
        }
        SourceTag::Link => by_extension,
    }
}

fn extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_tag_context_wins() {
        // a script served without a .js extension is still js
        assert_eq!(
            classify(&url("https://x.com/bundle?v=3"), &SourceTag::Script),
            AssetCategory::Js
        );
        assert_eq!(
            classify(&url("https://x.com/style.php"), &SourceTag::LinkStylesheet),
            AssetCategory::Css
        );
        assert_eq!(
            classify(&url("https://x.com/photo"), &SourceTag::Img),
            AssetCategory::Image
        );
        assert_eq!(
            classify(&url("https://x.com/clip.mp4"), &SourceTag::PictureSource),
            AssetCategory::Image
        );
        assert_eq!(
            classify(&url("https://x.com/clip"), &SourceTag::MediaSource),
            AssetCategory::Video
        );
    }

    #[test]
    fn test_extension_fallback_for_generic_link() {
        assert_eq!(
            classify(&url("https://x.com/site.webmanifest"), &SourceTag::Link),
            AssetCategory::Other
        );
        assert_eq!(
            classify(&url("https://x.com/a/Font.WOFF2"), &SourceTag::Link),
            AssetCategory::Font
        );
        assert_eq!(
            classify(&url("https://x.com/print.css"), &SourceTag::Link),
            AssetCategory::Css
        );
    }

    #[test]
    fn test_preload_destination() {
        let tag = SourceTag::LinkPreload {
            destination: Some("font".to_string()),
        };
        assert_eq!(classify(&url("https://x.com/f"), &tag), AssetCategory::Font);

        let tag = SourceTag::LinkPreload { destination: None };
        assert_eq!(
            classify(&url("https://x.com/app.js"), &tag),
            AssetCategory::Js
        );
    }

    #[test]
    fn test_css_contexts() {
        assert_eq!(
            classify(&url("https://x.com/css/fonts/b.woff2"), &SourceTag::CssImport),
            AssetCategory::Font
        );
        assert_eq!(
            classify(&url("https://x.com/css/theme"), &SourceTag::CssImport),
            AssetCategory::Css
        );
        assert_eq!(
            classify(&url("https://x.com/bg"), &SourceTag::CssUrl),
            AssetCategory::Image
        );
        assert_eq!(
            classify(&url("https://x.com/f?family=Inter"), &SourceTag::CssFontFace),
            AssetCategory::Font
        );
    }

    #[test]
    fn test_anchor_defaults_to_html() {
        assert_eq!(
            classify(&url("https://x.com/about/"), &SourceTag::Anchor),
            AssetCategory::Html
        );
        assert_eq!(
            classify(&url("https://x.com/logo.png"), &SourceTag::Anchor),
            AssetCategory::Image
        );
    }

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            AssetCategory::from_content_type("text/html; charset=utf-8"),
            AssetCategory::Html
        );
        assert_eq!(
            AssetCategory::from_content_type("application/javascript"),
            AssetCategory::Js
        );
        assert_eq!(
            AssetCategory::from_content_type("font/woff2"),
            AssetCategory::Font
        );
        assert_eq!(
            AssetCategory::from_content_type("audio/mpeg"),
            AssetCategory::Video
        );
        assert_eq!(
            AssetCategory::from_content_type("application/pdf"),
            AssetCategory::Other
        );
    }

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AssetCategory::Image).unwrap(),
            "\"image\""
        );
        assert_eq!(AssetCategory::Js.to_string(), "js");
    }
}
