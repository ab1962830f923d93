// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reader and writer interfaces for record text formats

use crate::{RecordCollection, Result};

/// Progress callback: (phase, percent complete)
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// Reads record text into a collection
///
/// Implemented by the IDF parser; a reader is bound to one schema.
pub trait RecordReader {
    /// Parse text into a record collection
    fn read(&self, content: &str) -> Result<RecordCollection>;

    /// Parse text with progress reporting
    fn read_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<RecordCollection> {
        on_progress("Parsing", 0.0);
        let collection = self.read(content)?;
        on_progress("Done", 100.0);
        Ok(collection)
    }
}

/// Renders a collection as text
pub trait RecordWriter {
    fn write(&self, collection: &RecordCollection) -> String;
}
