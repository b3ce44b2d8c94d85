use crate::DocumentId;
use pdf_sign::{LoadedDocument, RenderedPage};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

/// Maximum number of pages to cache
const MAX_CACHED_PAGES: usize = 50;

type CacheKey = (DocumentId, u32, u32);

struct StoredDocument {
    document: LoadedDocument,
    /// Where the document was read from, when it came from disk
    source: Option<PathBuf>,
}

/// Documents loaded by the worker, plus recently rendered pages
pub struct DocumentStore {
    documents: HashMap<DocumentId, StoredDocument>,
    page_cache: HashMap<CacheKey, RenderedPage>,
    cache_order: VecDeque<CacheKey>,
    next_doc_id: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            page_cache: HashMap::new(),
            cache_order: VecDeque::new(),
            next_doc_id: 1,
        }
    }

    pub fn insert(&mut self, document: LoadedDocument, source: Option<PathBuf>) -> DocumentId {
        let id = DocumentId(self.next_doc_id);
        self.next_doc_id += 1;
        self.documents.insert(id, StoredDocument { document, source });
        id
    }

    pub fn get(&self, id: DocumentId) -> Option<&LoadedDocument> {
        self.documents.get(&id).map(|stored| &stored.document)
    }

    pub fn source_path(&self, id: DocumentId) -> Option<&Path> {
        self.documents.get(&id).and_then(|stored| stored.source.as_deref())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Forget a document and every cached page of it
    pub fn remove(&mut self, id: DocumentId) -> Option<LoadedDocument> {
        let stored = self.documents.remove(&id)?;
        self.cache_order.retain(|key| key.0 != id);
        self.page_cache.retain(|key, _| key.0 != id);
        Some(stored.document)
    }

    /// Look up a rendered page, marking it most recently used
    pub fn cached_page(&mut self, id: DocumentId, page_number: u32, width_px: u32) -> Option<&RenderedPage> {
        let key = (id, page_number, width_px);
        if !self.page_cache.contains_key(&key) {
            return None;
        }
        self.cache_order.retain(|k| k != &key);
        self.cache_order.push_back(key);
        self.page_cache.get(&key)
    }

    pub fn cache_page(&mut self, id: DocumentId, width_px: u32, page: RenderedPage) {
        let key = (id, page.page_number, width_px);
        // Remove if already exists (update LRU)
        if self.page_cache.contains_key(&key) {
            self.cache_order.retain(|k| k != &key);
        }

        self.page_cache.insert(key, page);
        self.cache_order.push_back(key);

        while self.cache_order.len() > MAX_CACHED_PAGES {
            if let Some(oldest) = self.cache_order.pop_front() {
                self.page_cache.remove(&oldest);
            }
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}
