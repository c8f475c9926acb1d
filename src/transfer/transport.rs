//! Transport boundary for the remote sticker service.
//!
//! The wire protocol and pack encryption are the client library's problem,
//! not this tool's: everything above talks to the [`PackTransport`] trait
//! and only ever sees whole packs and id/key pairs. [`HttpTransport`] is
//! the shipped implementation, a thin blocking HTTP adapter.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::error::{Result, StickerError};

/// Service endpoint used when `STICKER_SERVICE_URL` is unset.
pub const DEFAULT_SERVICE_URL: &str = "https://api.signal.art";

/// Remote identity of an uploaded pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRef {
    pub id: String,
    pub key: String,
}

/// One sticker as the service sees it: sequential id, emoji, raw bytes.
#[derive(Debug, Clone)]
pub struct PackSticker {
    pub id: u32,
    pub emoji: String,
    pub bytes: Vec<u8>,
}

/// A pack shaped for the boundary with the transport client.
#[derive(Debug, Clone)]
pub struct Pack {
    pub title: String,
    pub author: String,
    pub stickers: Vec<PackSticker>,
    pub cover: Option<PackSticker>,
}

/// The seam between this tool and the remote service client.
pub trait PackTransport {
    /// Publish a pack, returning its assigned id and key.
    fn upload(&self, pack: &Pack, credentials: &Credentials) -> Result<PackRef>;

    /// Fetch a pack by id and key.
    fn download(&self, pack: &PackRef) -> Result<Pack>;
}

/// Upload manifest part: sticker metadata without the image bytes, which
/// travel as separate multipart parts.
#[derive(Debug, Serialize)]
struct WireManifest<'a> {
    title: &'a str,
    author: &'a str,
    stickers: Vec<WireStickerMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<WireStickerMeta>,
}

#[derive(Debug, Serialize)]
struct WireStickerMeta {
    id: u32,
    emoji: String,
}

#[derive(Debug, Deserialize)]
struct WirePackRef {
    id: String,
    key: String,
}

/// Download payload: image bytes arrive base64-encoded in JSON.
#[derive(Debug, Deserialize)]
struct WirePack {
    title: String,
    author: String,
    stickers: Vec<WireSticker>,
    #[serde(default)]
    cover: Option<WireSticker>,
}

#[derive(Debug, Deserialize)]
struct WireSticker {
    id: u32,
    #[serde(default)]
    emoji: String,
    data: String,
}

impl WireSticker {
    fn into_sticker(self) -> Result<PackSticker> {
        let bytes = BASE64.decode(&self.data).map_err(|e| StickerError::Transfer {
            message: format!("service returned undecodable sticker {}: {}", self.id, e),
        })?;
        Ok(PackSticker {
            id: self.id,
            emoji: self.emoji,
            bytes,
        })
    }
}

impl WirePack {
    fn into_pack(self) -> Result<Pack> {
        let stickers = self
            .stickers
            .into_iter()
            .map(WireSticker::into_sticker)
            .collect::<Result<Vec<_>>>()?;
        let cover = self.cover.map(WireSticker::into_sticker).transpose()?;
        Ok(Pack {
            title: self.title,
            author: self.author,
            stickers,
            cover,
        })
    }
}

/// Blocking HTTP implementation of [`PackTransport`].
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport against `STICKER_SERVICE_URL` or the default
    /// service endpoint.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("STICKER_SERVICE_URL")
            .unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| StickerError::Transfer {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, base_url })
    }
}

impl PackTransport for HttpTransport {
    fn upload(&self, pack: &Pack, credentials: &Credentials) -> Result<PackRef> {
        let manifest = WireManifest {
            title: &pack.title,
            author: &pack.author,
            stickers: pack
                .stickers
                .iter()
                .map(|s| WireStickerMeta {
                    id: s.id,
                    emoji: s.emoji.clone(),
                })
                .collect(),
            cover: pack.cover.as_ref().map(|c| WireStickerMeta {
                id: c.id,
                emoji: c.emoji.clone(),
            }),
        };
        let manifest_json = serde_json::to_string(&manifest).map_err(|e| StickerError::Transfer {
            message: format!("failed to encode pack manifest: {}", e),
        })?;

        let mut form = reqwest::blocking::multipart::Form::new().text("manifest", manifest_json);
        for sticker in &pack.stickers {
            form = form.part(
                format!("sticker-{}", sticker.id),
                reqwest::blocking::multipart::Part::bytes(sticker.bytes.clone()),
            );
        }
        if let Some(cover) = &pack.cover {
            form = form.part(
                "cover",
                reqwest::blocking::multipart::Part::bytes(cover.bytes.clone()),
            );
        }

        let url = format!("{}/v1/packs", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .multipart(form)
            .send()
            .map_err(|e| StickerError::Transfer {
                message: format!("upload request failed: {}", e),
            })?;

        let response = check_status(response, "upload")?;
        let wire: WirePackRef = response.json().map_err(|e| StickerError::Transfer {
            message: format!("unexpected upload response: {}", e),
        })?;

        Ok(PackRef {
            id: wire.id,
            key: wire.key,
        })
    }

    fn download(&self, pack: &PackRef) -> Result<Pack> {
        let url = format!("{}/v1/packs/{}", self.base_url, pack.id);
        let response = self
            .client
            .get(&url)
            .query(&[("pack_key", pack.key.as_str())])
            .send()
            .map_err(|e| StickerError::Transfer {
                message: format!("download request failed: {}", e),
            })?;

        let response = check_status(response, "download")?;
        let wire: WirePack = response.json().map_err(|e| StickerError::Transfer {
            message: format!("unexpected download response: {}", e),
        })?;

        wire.into_pack()
    }
}

/// Collapse an HTTP error status into one descriptive transfer error.
fn check_status(
    response: reqwest::blocking::Response,
    operation: &str,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(StickerError::Transfer {
        message: format!("{} failed: {} {}", operation, status, body.trim()),
    })
}
