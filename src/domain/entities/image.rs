//! Image entity - Media attached to a record

use serde::{Deserialize, Serialize};

use super::JsonObject;

/// Role of an image; anything unrecognized is `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Icon,
    Token,
    Portrait,
    Artwork,
    Other,
}

impl ImageType {
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Other;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "icon" | "thumbnail" | "thumb" => Self::Icon,
            "token" => Self::Token,
            "portrait" => Self::Portrait,
            "artwork" | "art" | "illustration" => Self::Artwork,
            _ => Self::Other,
        }
    }
}

impl Default for ImageType {
    fn default() -> Self {
        Self::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "type")]
    pub image_type: ImageType,
    /// Absolute URL once resolved
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub srcset: Vec<SrcsetEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_point: Option<FocalPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundry: Option<JsonObject>,
}

impl Image {
    pub fn new(image_type: ImageType, src: impl Into<String>) -> Self {
        Self {
            image_type,
            src: src.into(),
            alt: None,
            srcset: Vec::new(),
            mime: None,
            width: None,
            height: None,
            focal_point: None,
            attribution: None,
            foundry: None,
        }
    }
}

/// One responsive variant of an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrcsetEntry {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

/// Relative point of interest, both axes in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

impl FocalPoint {
    pub fn new(x: f64, y: f64) -> Option<Self> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        (in_range(x) && in_range(y)).then_some(Self { x, y })
    }
}
