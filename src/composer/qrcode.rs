//! QR code composition.
//!
//! The content string is derived from a tagged payload variant, then encoded
//! in-process: PNG output is resized to the requested square size with
//! Lanczos resampling, SVG output is vector and ignores the size parameter.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{validate_required, ValidationError, ValidationErrors};
use crate::error::CoreError;

const MIN_SIZE: u32 = 16;
const MAX_SIZE: u32 = 4096;

/// Typed QR payload; the tag selects the content derivation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QrPayload {
    Wifi {
        #[serde(default)]
        security: String,
        ssid: String,
        #[serde(default)]
        password: String,
    },
    Vcard {
        name: String,
        phone: String,
        email: String,
        #[serde(default)]
        organization: String,
    },
    Upi {
        payee_id: String,
        payee_name: String,
        amount: String,
    },
    Text {
        content: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QrFormat {
    #[default]
    Png,
    Svg,
}

impl QrFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            QrFormat::Png => "png",
            QrFormat::Svg => "svg",
        }
    }
}

/// Error-correction level; default M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum QrErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl QrErrorCorrection {
    fn ec_level(&self) -> EcLevel {
        match self {
            QrErrorCorrection::L => EcLevel::L,
            QrErrorCorrection::M => EcLevel::M,
            QrErrorCorrection::Q => EcLevel::Q,
            QrErrorCorrection::H => EcLevel::H,
        }
    }
}

fn default_size() -> u32 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QrRequest {
    #[serde(flatten)]
    pub payload: QrPayload,
    /// Square pixel size for raster output; ignored for SVG.
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub format: QrFormat,
    #[serde(default)]
    pub error_correction: QrErrorCorrection,
}

impl QrRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = ValidationErrors::new();

        match &self.payload {
            QrPayload::Wifi { ssid, .. } => {
                validate_required(ssid, "ssid", "WiFi SSID", &mut errors);
            }
            QrPayload::Vcard { name, .. } => {
                validate_required(name, "name", "Contact name", &mut errors);
            }
            QrPayload::Upi { payee_id, payee_name, .. } => {
                validate_required(payee_id, "payee_id", "Payee id", &mut errors);
                validate_required(payee_name, "payee_name", "Payee name", &mut errors);
            }
            QrPayload::Text { content } => {
                validate_required(content, "content", "Content", &mut errors);
            }
        }

        if self.format == QrFormat::Png && !(MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            errors.add(ValidationError::new(
                "size",
                format!("Size must be between {MIN_SIZE} and {MAX_SIZE} pixels"),
            ));
        }

        errors.into_result()
    }

    /// Encoded content string, fixed per payload type.
    pub fn content(&self) -> String {
        match &self.payload {
            QrPayload::Wifi { security, ssid, password } => {
                format!("WIFI:T:{security};S:{ssid};P:{password};;")
            }
            QrPayload::Vcard { name, phone, email, organization } => format!(
                "BEGIN:VCARD\nVERSION:3.0\nFN:{name}\nTEL:{phone}\nEMAIL:{email}\nORG:{organization}\nEND:VCARD"
            ),
            QrPayload::Upi { payee_id, payee_name, amount } => {
                format!("upi://pay?pa={payee_id}&pn={payee_name}&am={amount}")
            }
            QrPayload::Text { content } => content.clone(),
        }
    }

    pub fn type_label(&self) -> &'static str {
        match &self.payload {
            QrPayload::Wifi { .. } => "Wifi",
            QrPayload::Vcard { .. } => "Vcard",
            QrPayload::Upi { .. } => "Upi",
            QrPayload::Text { .. } => "Text",
        }
    }

    pub fn title(&self) -> String {
        format!("QR Code - {}", self.type_label())
    }

    /// Encode the content and render artifact bytes in the requested format.
    pub fn render(&self) -> Result<Vec<u8>, CoreError> {
        let code = QrCode::with_error_correction_level(
            self.content().as_bytes(),
            self.error_correction.ec_level(),
        )
        .map_err(|err| CoreError::Render(format!("QR encoding failed: {err}")))?;

        match self.format {
            QrFormat::Svg => {
                let image = code
                    .render::<svg::Color>()
                    .dark_color(svg::Color("#000000"))
                    .light_color(svg::Color("#ffffff"))
                    .build();
                Ok(image.into_bytes())
            }
            QrFormat::Png => {
                let image = code
                    .render::<Luma<u8>>()
                    .dark_color(Luma([0u8]))
                    .light_color(Luma([255u8]))
                    .build();
                let resized =
                    image::imageops::resize(&image, self.size, self.size, FilterType::Lanczos3);
                let mut bytes = Vec::new();
                DynamicImage::ImageLuma8(resized)
                    .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
                    .map_err(|err| CoreError::Render(format!("PNG encoding failed: {err}")))?;
                Ok(bytes)
            }
        }
    }
}
