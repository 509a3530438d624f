use crate::document::Document;

/// Read-only view of the sibling documents surrounding a focal document
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'a> {
    documents: &'a [Document],
}

impl<'a> Context<'a> {
    pub fn new(documents: &'a [Document]) -> Self {
        Self { documents }
    }

    /// A context with no siblings
    pub fn empty() -> Self {
        Self { documents: &[] }
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for Context<'a> {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
