//! Gallery of manifested concept images.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Unique identifier for a gallery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create a new unique entry ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| CoreError::InvalidEntryId(format!("{s}: {e}")))
    }
}

/// Encoded image formats the image endpoint may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// WebP image.
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else {
            Self::Unknown
        }
    }

    /// MIME type for this format. Unknown payloads are labelled as PNG,
    /// which is what the image endpoint is asked to produce.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Png | Self::Unknown => "image/png",
        }
    }
}

/// Decoded image payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Encoded image bytes (PNG unless the endpoint says otherwise).
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: String,
}

impl ImageData {
    /// Wrap encoded bytes, sniffing the MIME type from the payload.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        let mime_type = ImageFormat::from_magic_bytes(&bytes).mime_type().to_string();
        Self { bytes, mime_type }
    }

    /// Decode a base64 payload.
    ///
    /// # Errors
    ///
    /// Returns the base64 decode error when the payload is malformed.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(encoded.trim()).map(Self::new)
    }

    /// Detected encoding of the payload.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_magic_bytes(&self.bytes)
    }

    /// Render as a `data:` URL for front ends that embed images inline.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A single manifested image in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Identity used for removal.
    pub id: EntryId,
    /// The image itself.
    pub image: ImageData,
}

/// Ordered collection of manifested images. Order is arrival order.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
    scroll_target: Option<EntryId>,
}

impl Gallery {
    /// Create an empty gallery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of images, returning the ids of the new entries in order.
    ///
    /// The first new entry becomes the scroll target.
    pub fn append(&mut self, images: impl IntoIterator<Item = ImageData>) -> Vec<EntryId> {
        let ids: Vec<EntryId> = images
            .into_iter()
            .map(|image| {
                let id = EntryId::new();
                self.entries.push(GalleryEntry { id, image });
                id
            })
            .collect();

        if let Some(first) = ids.first() {
            self.scroll_target = Some(*first);
        }
        tracing::debug!(added = ids.len(), total = self.entries.len(), "Gallery append");
        ids
    }

    /// Remove one entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntryNotFound`] if no entry has this id.
    pub fn remove(&mut self, id: EntryId) -> CoreResult<GalleryEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| CoreError::EntryNotFound(id.to_string()))?;

        if self.scroll_target == Some(id) {
            self.scroll_target = None;
        }
        Ok(self.entries.remove(index))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.scroll_target = None;
    }

    /// Entries in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    /// Ids in arrival order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Look up an entry by its 1-based position.
    #[must_use]
    pub fn nth(&self, position: usize) -> Option<&GalleryEntry> {
        position.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// First entry of the most recent batch, if still present.
    #[must_use]
    pub fn scroll_target(&self) -> Option<EntryId> {
        self.scroll_target
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the gallery is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png(tag: u8) -> ImageData {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.push(tag);
        ImageData::new(bytes)
    }

    #[test]
    fn append_preserves_order_and_sets_scroll_target() {
        let mut gallery = Gallery::new();
        let ids = gallery.append([png(1), png(2), png(3)]);

        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.ids(), ids);
        assert_eq!(gallery.scroll_target(), Some(ids[0]));
        assert_eq!(gallery.entries()[2].image.bytes.last(), Some(&3));

        let more = gallery.append([png(4)]);
        assert_eq!(gallery.scroll_target(), Some(more[0]));
    }

    #[test]
    fn empty_batch_keeps_scroll_target() {
        let mut gallery = Gallery::new();
        let ids = gallery.append([png(1)]);
        assert!(gallery.append(Vec::new()).is_empty());
        assert_eq!(gallery.scroll_target(), Some(ids[0]));
    }

    #[test]
    fn remove_every_entry_leaves_empty() {
        let mut gallery = Gallery::new();
        let ids = gallery.append([png(1), png(2)]);
        for id in ids {
            gallery.remove(id).expect("entry should exist");
        }
        assert!(gallery.is_empty());
        assert_eq!(gallery.scroll_target(), None);
    }

    #[test]
    fn remove_unknown_entry_fails() {
        let mut gallery = Gallery::new();
        gallery.append([png(1)]);
        let result = gallery.remove(EntryId::new());
        assert!(matches!(result, Err(CoreError::EntryNotFound(_))));
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn nth_is_one_based() {
        let mut gallery = Gallery::new();
        let ids = gallery.append([png(1), png(2)]);
        assert!(gallery.nth(0).is_none());
        assert_eq!(gallery.nth(2).map(|e| e.id), Some(ids[1]));
        assert!(gallery.nth(3).is_none());
    }

    #[test]
    fn entry_id_parses_from_display() {
        let id = EntryId::new();
        let parsed: EntryId = id.to_string().parse().expect("valid uuid");
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<EntryId>().is_err());
    }

    #[test]
    fn format_detection() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_MAGIC), ImageFormat::Png);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBP"), ImageFormat::WebP);
        assert_eq!(ImageFormat::from_magic_bytes(b"xy"), ImageFormat::Unknown);
    }

    #[test]
    fn data_url_round_trips_base64() {
        let image = ImageData::from_base64("iVBORw0KGgo=").expect("valid base64");
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw0KGgo=");
        assert!(ImageData::from_base64("***").is_err());
    }
}
