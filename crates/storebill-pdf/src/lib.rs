//! # storebill-pdf: Document Rendering for Storebill
//!
//! Renders invoices and catalog exports as A4 PDF documents.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PDF Rendering Flow                                │
//! │                                                                         │
//! │  storebill-db (loads invoice + items + customer + store profile)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceDocument / catalog product list (plain data, no pool handle)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  render_invoice() / render_catalog() ──► Vec<u8> (PDF bytes)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write_pdf() ──► file on disk, or hand bytes to a print dialog          │
//! │                                                                         │
//! │  Rendering never touches the database; callers assemble the inputs.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fonts
//! Builtin Helvetica variants only. Nothing to bundle, and every PDF
//! viewer renders them identically.

pub mod catalog;
pub mod invoice;

use std::path::Path;

use thiserror::Error;

pub use catalog::render_catalog;
pub use invoice::{render_invoice, InvoiceDocument, PrintLine};

/// A4 page width in millimeters.
pub(crate) const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 page height in millimeters.
pub(crate) const PAGE_HEIGHT_MM: f32 = 297.0;
/// Left/right page margin in millimeters.
pub(crate) const MARGIN_MM: f32 = 15.0;

/// PDF rendering errors.
#[derive(Debug, Error)]
pub enum PdfError {
    /// printpdf failed to build or serialize the document.
    #[error("PDF rendering failed: {0}")]
    Render(String),

    /// Writing the finished document to disk failed.
    #[error("Could not write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for PDF operations.
pub type PdfResult<T> = Result<T, PdfError>;

/// Writes rendered PDF bytes to a file.
pub fn write_pdf(bytes: &[u8], path: impl AsRef<Path>) -> PdfResult<()> {
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Formats an amount with two decimals for display.
pub(crate) fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(216.0), "216.00");
        assert_eq!(format_money(0.5), "0.50");
        assert_eq!(format_money(1234.567), "1234.57");
    }
}
