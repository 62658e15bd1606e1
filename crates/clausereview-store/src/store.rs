//! In-memory passage store.

use clausereview_core::Document;
use tracing::debug;

/// Passages indexed for retrieval, in insertion order.
///
/// `generation` increases on every mutation so retrievers can tell when
/// their fitted index is stale.
#[derive(Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    generation: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents. Ids are not checked for uniqueness.
    pub fn write_documents(&mut self, docs: Vec<Document>) {
        if docs.is_empty() {
            return;
        }
        debug!(count = docs.len(), "writing documents");
        self.documents.extend(docs);
        self.generation += 1;
    }

    /// Replace every passage from the named source file.
    ///
    /// Returns the number of passages removed.
    pub fn replace_source(&mut self, name: &str, docs: Vec<Document>) -> usize {
        let before = self.documents.len();
        self.documents.retain(|d| d.meta.name != name);
        let removed = before - self.documents.len();
        let added = docs.len();
        self.documents.extend(docs);
        if removed > 0 || added > 0 {
            self.generation += 1;
        }
        debug!(name, removed, added, "replaced source");
        removed
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Passages from one source file, in paragraph order.
    pub fn documents_for(&self, name: &str) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| d.meta.name == name)
            .collect();
        docs.sort_by_key(|d| d.meta.paragraph);
        docs
    }

    /// Distinct source file names, in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for doc in &self.documents {
            if !names.contains(&doc.meta.name.as_str()) {
                names.push(&doc.meta.name);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, paragraph: usize, text: &str) -> Document {
        Document::new(name, paragraph, text.to_string())
    }

    #[test]
    fn write_appends_and_bumps_generation() {
        let mut store = DocumentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);

        store.write_documents(vec![doc("a.txt", 0, "alpha"), doc("a.txt", 1, "beta")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.generation(), 1);

        // Repeated writes are accepted as-is.
        store.write_documents(vec![doc("a.txt", 0, "alpha")]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn write_empty_is_noop() {
        let mut store = DocumentStore::new();
        store.write_documents(vec![]);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn replace_source_swaps_only_that_file() {
        let mut store = DocumentStore::new();
        store.write_documents(vec![doc("a.txt", 0, "old a"), doc("b.txt", 0, "b")]);

        let removed = store.replace_source("a.txt", vec![doc("a.txt", 0, "new a")]);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.documents_for("a.txt")[0].content, "new a");
        assert_eq!(store.documents_for("b.txt")[0].content, "b");
    }

    #[test]
    fn replace_same_content_twice_does_not_duplicate() {
        let mut store = DocumentStore::new();
        store.replace_source("a.txt", vec![doc("a.txt", 0, "same")]);
        store.replace_source("a.txt", vec![doc("a.txt", 0, "same")]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn replace_unchanged_empty_keeps_generation() {
        let mut store = DocumentStore::new();
        store.replace_source("missing.txt", vec![]);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn documents_for_orders_by_paragraph() {
        let mut store = DocumentStore::new();
        store.write_documents(vec![doc("a.txt", 2, "c"), doc("a.txt", 0, "a"), doc("a.txt", 1, "b")]);
        let contents: Vec<&str> = store
            .documents_for("a.txt")
            .iter()
            .map(|d| d.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn sources_first_seen_order() {
        let mut store = DocumentStore::new();
        store.write_documents(vec![doc("b.txt", 0, "x"), doc("a.txt", 0, "y"), doc("b.txt", 1, "z")]);
        assert_eq!(store.sources(), vec!["b.txt", "a.txt"]);
    }
}
