//! Application packet rendering
//!
//! A packet is built once as a format-neutral [`PacketDocument`] and then
//! encoded as PDF or DOCX, so both encodings carry identical content.

pub mod document;
pub mod docx;
pub mod generator;
pub mod pdf;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use document::{format_currency, Block, PacketDocument, PACKET_TITLE};
pub use docx::render_docx;
pub use generator::{packet_filename, PacketGenerator};
pub use pdf::render_pdf;

/// Errors raised while encoding a packet
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX packaging failed: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported packet encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketFormat {
    Pdf,
    Docx,
}

impl PacketFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PacketFormat::Pdf => "pdf",
            PacketFormat::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            PacketFormat::Pdf => "application/pdf",
            PacketFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Encode a packet document in this format
    pub fn render(&self, document: &PacketDocument) -> Result<Vec<u8>, RenderError> {
        match self {
            PacketFormat::Pdf => render_pdf(document),
            PacketFormat::Docx => render_docx(document),
        }
    }
}

impl fmt::Display for PacketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for PacketFormat {
    type Err = String;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(PacketFormat::Pdf),
            "docx" => Ok(PacketFormat::Docx),
            _ => Err(format!("Unsupported format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<PacketFormat>().unwrap(), PacketFormat::Pdf);
        assert_eq!("Docx".parse::<PacketFormat>().unwrap(), PacketFormat::Docx);
        assert_eq!(
            "csv".parse::<PacketFormat>().unwrap_err(),
            "Unsupported format: csv"
        );
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(PacketFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(PacketFormat::Docx.extension(), "docx");
    }
}
