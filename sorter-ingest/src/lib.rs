//! sorter-ingest: page-text sources, bank identification and the per-bank
//! extraction strategies.

pub mod classifier;
pub mod identify;
pub mod source;
pub mod strategies;

pub use classifier::{Classification, Classifier};
pub use identify::{BankIdentifier, IdSource, Identification};
pub use source::{
    ChainedTextSource, PageText, PdfTextSource, SidecarTextSource, TextSource, TextSourceError,
};
pub use strategies::{Dispatcher, Strategy};
