//! Page-tree assembly.
//!
//! [`PageAssembly`] builds the output document page by page. Each source
//! document is renumbered past the ids already in use, its first page is
//! detached from the source tree (inherited attributes are copied onto the
//! page itself), and the page dictionary is added as many times as labels are
//! needed. All copies share the same content streams and resources.
//!
//! Nothing of the source page tree is carried over: references into it (an
//! annotation's `/P`, a destination naming another page) are dropped, so
//! the discarded pages never end up in the output.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::BTreeSet;

use crate::error::AssemblyError;
use crate::utils::copy_references;

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains.
const MAX_TREE_DEPTH: usize = 64;

/// Output document under construction.
pub struct PageAssembly {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl Default for PageAssembly {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAssembly {
    /// Start an empty document.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append the first page of `source` `copies` times.
    ///
    /// Zero copies leaves the document untouched. On error nothing has been
    /// added.
    pub fn append_first_page(&mut self, mut source: Document, copies: u32) -> Result<(), AssemblyError> {
        if copies == 0 {
            return Ok(());
        }

        source.renumber_objects_with(self.document.max_id + 1);

        let (_, page_id) = source
            .get_pages()
            .into_iter()
            .next()
            .ok_or_else(|| AssemblyError::page_tree("document has no pages"))?;

        let first_new_id = self.document.max_id + 1;
        let mut page = detached_page(&source, page_id)?;
        let tree = page_tree_nodes(&source);

        strip_references(&mut page, &tree);
        copy_references(
            &mut self.document,
            &source,
            &Object::Dictionary(page.clone()),
            &tree,
        );
        for (_, object) in self.document.objects.range_mut((first_new_id, 0)..) {
            strip_object_references(object, &tree);
        }
        self.document.max_id = self.document.max_id.max(source.max_id);

        page.set("Parent", self.pages_id);
        for _ in 0..copies {
            let copy_id = self.document.add_object(page.clone());
            self.kids.push(copy_id.into());
        }

        Ok(())
    }

    /// Close the page tree and return the finished document.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::NoPagesToSave`] if no page was appended.
    pub fn finish(self) -> Result<Document, AssemblyError> {
        let Self {
            mut document,
            pages_id,
            kids,
        } = self;

        if kids.is_empty() {
            return Err(AssemblyError::NoPagesToSave);
        }

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Ok(document)
    }
}

/// Ids of every `Page` and `Pages` node in `doc`.
fn page_tree_nodes(doc: &Document) -> BTreeSet<ObjectId> {
    doc.objects
        .iter()
        .filter(|(_, object)| {
            let dict = match object {
                Object::Dictionary(dict) => dict,
                Object::Stream(stream) => &stream.dict,
                _ => return false,
            };
            matches!(dict.get(b"Type"), Ok(Object::Name(name)) if matches!(name.as_slice(), b"Page" | b"Pages"))
        })
        .map(|(id, _)| *id)
        .collect()
}

/// Remove dictionary entries that point at `excluded` and null out such
/// array elements, recursively through direct objects.
fn strip_references(dict: &mut Dictionary, excluded: &BTreeSet<ObjectId>) {
    let dangling: Vec<Vec<u8>> = dict
        .iter()
        .filter(|(_, value)| matches!(value, Object::Reference(id) if excluded.contains(id)))
        .map(|(key, _)| key.clone())
        .collect();
    for key in dangling {
        dict.remove(&key);
    }

    for (_, value) in dict.iter_mut() {
        strip_object_references(value, excluded);
    }
}

fn strip_object_references(object: &mut Object, excluded: &BTreeSet<ObjectId>) {
    match object {
        Object::Dictionary(dict) => strip_references(dict, excluded),
        Object::Stream(stream) => strip_references(&mut stream.dict, excluded),
        Object::Array(items) => {
            for item in items.iter_mut() {
                if matches!(item, Object::Reference(id) if excluded.contains(id)) {
                    *item = Object::Null;
                } else {
                    strip_object_references(item, excluded);
                }
            }
        }
        _ => {}
    }
}

/// Clone a page dictionary, pulling inherited attributes down from its
/// ancestors and dropping the link back into the source tree.
fn detached_page(source: &Document, page_id: ObjectId) -> Result<Dictionary, AssemblyError> {
    let mut page = source
        .get_dictionary(page_id)
        .map_err(|err| AssemblyError::page_tree(format!("page {page_id:?}: {err}")))?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            return Err(AssemblyError::page_tree("page tree is nested too deeply"));
        }

        let Ok(node) = source.get_dictionary(parent_id) else {
            break;
        };

        for key in INHERITABLE {
            if !page.has(key)
                && let Ok(value) = node.get(key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    page.remove(b"Parent");
    Ok(page)
}
