//! SourceAdapter trait: the contract adapters implement
//!
//! An adapter turns one source's native input into raw OWLNETS records and
//! pushes them through a [`GraphSink`]. Parsing OWL, GTF, spreadsheets and
//! the like is the adapter's business; canonicalization is the sink's.

use super::sink::{AdapterError, EmitResult, GraphSink};

pub trait SourceAdapter {
    /// Unique identifier for this adapter
    fn id(&self) -> &str;

    /// Read the input and emit its records through the sink.
    fn process(&self, sink: &mut GraphSink<'_>) -> Result<EmitResult, AdapterError>;
}
