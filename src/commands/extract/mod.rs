//! `extract`: PDF text extraction with OCR fallback, regex cleanup and
//! sentence segmentation, one report per document.

mod cleanup;
mod ocr;
mod quality;
mod report;
mod run;
mod sentences;
mod text_layer;

pub use run::run;
