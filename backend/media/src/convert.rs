//! WebP conversion through ezgif.
//!
//! ezgif converts in two round trips: the first request uploads the source
//! and answers with a form, the second re-posts that form and answers with a
//! page linking the converted file.

use std::sync::LazyLock;

use bytes::Bytes;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::MediaError;

pub const EZGIF_UPLOAD_BASE: &str = "https://s6.ezgif.com";
pub const EZGIF_CONVERT_BASE: &str = "https://ezgif.com";

static FORM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<form\b[^>]*>(.*?)</form>").unwrap());
static INPUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").unwrap());
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\b([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});
static OUTPUT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?is)\bid\s*=\s*["']?output\b"#).unwrap());
static OUTFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<p\b[^>]*\bclass\s*=\s*["'][^"']*\boutfile\b"#).unwrap());

/// Input to a conversion: a remote URL or the raw WebP bytes.
#[derive(Debug, Clone)]
pub enum MediaSource {
    Url(String),
    Bytes(Bytes),
}

impl From<&str> for MediaSource {
    /// Text containing an `http(s)://` URL is passed by reference; any
    /// other text is uploaded as-is.
    fn from(source: &str) -> Self {
        if source.contains("http://") || source.contains("https://") {
            MediaSource::Url(source.to_string())
        } else {
            MediaSource::Bytes(Bytes::copy_from_slice(source.as_bytes()))
        }
    }
}

impl From<Bytes> for MediaSource {
    fn from(data: Bytes) -> Self {
        MediaSource::Bytes(data)
    }
}

impl From<Vec<u8>> for MediaSource {
    fn from(data: Vec<u8>) -> Self {
        MediaSource::Bytes(Bytes::from(data))
    }
}

/// Output format of a WebP conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertTarget {
    Mp4,
    Png,
}

impl ConvertTarget {
    fn tool(self) -> &'static str {
        match self {
            ConvertTarget::Mp4 => "webp-to-mp4",
            ConvertTarget::Png => "webp-to-png",
        }
    }

    /// Tag inside the output paragraph that carries the file link.
    fn output_tag(self) -> &'static str {
        match self {
            ConvertTarget::Mp4 => "source",
            ConvertTarget::Png => "img",
        }
    }
}

pub struct EzgifConverter {
    client: Client,
    upload_base: String,
    convert_base: String,
}

impl EzgifConverter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            upload_base: EZGIF_UPLOAD_BASE.to_string(),
            convert_base: EZGIF_CONVERT_BASE.to_string(),
        }
    }

    /// Override both ezgif hosts.
    pub fn with_bases(mut self, upload_base: impl Into<String>, convert_base: impl Into<String>) -> Self {
        self.upload_base = upload_base.into();
        self.convert_base = convert_base.into();
        self
    }

    /// Convert an animated WebP to MP4 and return the video URL.
    pub async fn webp_to_mp4(&self, source: impl Into<MediaSource>) -> Result<Url, MediaError> {
        self.convert(source.into(), ConvertTarget::Mp4).await
    }

    /// Convert a WebP to PNG and return the image URL.
    pub async fn webp_to_png(&self, source: impl Into<MediaSource>) -> Result<Url, MediaError> {
        self.convert(source.into(), ConvertTarget::Png).await
    }

    pub async fn convert(&self, source: MediaSource, target: ConvertTarget) -> Result<Url, MediaError> {
        let tool = target.tool();
        let upload_url = format!("{}/{}", self.upload_base, tool);
        info!(tool, "Uploading WebP to ezgif");

        let (url_field, image) = match source {
            MediaSource::Url(url) => (url, Part::bytes(Vec::new())),
            MediaSource::Bytes(data) => (String::new(), Part::bytes(data.to_vec())),
        };
        let form = Form::new()
            .text("new-image-url", url_field)
            .part("new-image", image.file_name("image.webp"));

        let page = self
            .client
            .post(&upload_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let fields = form_fields(&page);
        let file = fields
            .iter()
            .find(|(name, _)| name == "file")
            .map(|(_, value)| value.clone())
            .ok_or(MediaError::MissingField("file"))?;
        debug!(file = %file, fields = fields.len(), "ezgif upload form parsed");

        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let convert_url = format!("{}/{}/{}", self.convert_base, tool, file);

        let response = self
            .client
            .post(&convert_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        let base = response.url().clone();
        let page = response.text().await?;

        let src = output_src(&page, target.output_tag()).ok_or(MediaError::MissingField("output file"))?;
        let output = base.join(&src)?;
        info!(output = %output, "ezgif conversion finished");
        Ok(output)
    }
}

/// Every named `<input>` inside a `<form>`, in document order.
fn form_fields(html: &str) -> Vec<(String, String)> {
    FORM_RE
        .captures_iter(html)
        .filter_map(|form| form.get(1))
        .flat_map(|body| INPUT_RE.find_iter(body.as_str()))
        .filter_map(|input| {
            let name = attr(input.as_str(), "name")?;
            let value = attr(input.as_str(), "value").unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// `src` of the first `tag` in the `.outfile` paragraph of `#output`.
fn output_src(html: &str, tag: &str) -> Option<String> {
    let output = &html[OUTPUT_RE.find(html)?.end()..];
    let outfile = &output[OUTFILE_RE.find(output)?.end()..];
    let tag_re = Regex::new(&format!(r"(?is)<{}\b[^>]*>", regex::escape(tag))).ok()?;
    let element = tag_re.find(outfile)?;
    attr(element.as_str(), "src")
}

fn attr(tag: &str, name: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(tag)
        .find(|c| c[1].eq_ignore_ascii_case(name))
        .and_then(|c| c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4)))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPLOAD_PAGE: &str = r#"
        <html><body>
        <form class="form ajax-form" action="https://ezgif.com/webp-to-mp4/ezgif-1-abc.webp" method="post">
            <input type="hidden" name="file" value="ezgif-1-abc.webp">
            <input type="text" name="start" value='0'>
            <input type="submit" value="Convert WebP to MP4!" class="button primary">
        </form>
        </body></html>
    "#;

    const MP4_PAGE: &str = r#"
        <div id="output">
            <p class="outfile"><video controls><source src="/tmp/ezgif-1-abc.mp4" type="video/mp4"></video></p>
        </div>
    "#;

    #[test]
    fn parses_named_form_inputs() {
        let fields = form_fields(UPLOAD_PAGE);
        assert_eq!(
            fields,
            vec![
                ("file".to_string(), "ezgif-1-abc.webp".to_string()),
                ("start".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn finds_output_source_and_image() {
        assert_eq!(output_src(MP4_PAGE, "source").as_deref(), Some("/tmp/ezgif-1-abc.mp4"));

        let png_page = r#"<div id="output"><p class="outfile"><img src="//s6.ezgif.com/tmp/x.png" alt=""></p></div>"#;
        assert_eq!(output_src(png_page, "img").as_deref(), Some("//s6.ezgif.com/tmp/x.png"));
        assert_eq!(output_src("<p class=\"outfile\"><img src=\"x\"></p>", "img"), None);
    }

    #[test]
    fn text_sources_are_classified() {
        assert!(matches!(MediaSource::from("https://example.com/a.webp"), MediaSource::Url(_)));
        assert!(matches!(MediaSource::from("RIFF....WEBP"), MediaSource::Bytes(_)));
    }

    #[tokio::test]
    async fn converts_through_both_steps() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("POST", "/webp-to-mp4")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(UPLOAD_PAGE)
            .create_async()
            .await;
        let convert = server
            .mock("POST", "/webp-to-mp4/ezgif-1-abc.webp")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(MP4_PAGE)
            .create_async()
            .await;

        let converter = EzgifConverter::new(Client::new()).with_bases(server.url(), server.url());
        let output = converter.webp_to_mp4("https://example.com/sticker.webp").await.unwrap();

        assert_eq!(output.as_str(), format!("{}/tmp/ezgif-1-abc.mp4", server.url()));
        upload.assert_async().await;
        convert.assert_async().await;
    }

    #[tokio::test]
    async fn missing_file_field_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/webp-to-png")
            .with_status(200)
            .with_body("<html>rate limited</html>")
            .create_async()
            .await;

        let converter = EzgifConverter::new(Client::new()).with_bases(server.url(), server.url());
        let err = converter.webp_to_png(Bytes::from_static(b"RIFF\0\0\0\0WEBP")).await.unwrap_err();
        assert!(matches!(err, MediaError::MissingField("file")));
    }
}
