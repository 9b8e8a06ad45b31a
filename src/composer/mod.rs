//! Document composition - deterministic assembly of validated payloads into
//! rendered artifacts.
//!
//! One module per document kind:
//! - `invoice` - line items with subtotal/discount/tax/total arithmetic
//! - `resume` - ordered sections, empty sections omitted
//! - `certificate` - single or premium-gated bulk fan-out
//! - `qrcode` - typed content derivation, PNG or SVG output
//!
//! PDF kinds emit Typst source compiled by `engine`; QR codes render
//! in-process.

pub mod certificate;
pub mod common;
pub mod engine;
pub mod invoice;
pub mod qrcode;
pub mod resume;
pub mod validation;

pub use certificate::CertificateRequest;
pub use engine::{PdfRenderer, TypstRenderer};
pub use invoice::{InvoiceItem, InvoiceRequest, InvoiceTotals};
pub use qrcode::{QrErrorCorrection, QrFormat, QrPayload, QrRequest};
pub use resume::ResumeRequest;
