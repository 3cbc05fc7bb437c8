//! PDF outline ("bookmarks") for the section starts of a rendered report.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::layout::PageDescriptor;

/// Errors raised while adding an outline to a rendered PDF.
#[derive(thiserror::Error, Debug)]
pub enum BookmarkError {
    #[error("PDF processing failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF catalog entry is missing")]
    MissingCatalog,

    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,

    #[error("bookmark {title:?} points at missing page {page}")]
    MissingPage { title: String, page: usize },
}

/// One outline entry: a title and the 1-based page it jumps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bookmark {
    pub title: String,
    pub page: usize,
}

/// Bookmarks for every page that opens a section, in page order.
pub fn section_bookmarks(pages: &[PageDescriptor]) -> Vec<Bookmark> {
    pages
        .iter()
        .filter(|page| page.kind.starts_section())
        .map(|page| Bookmark {
            title: page.kind.label().to_owned(),
            page: page.number.current,
        })
        .collect()
}

/// Rewrites `pdf_bytes` with a flat `/Outlines` tree. Each entry gets a `/Dest [page /Fit]`.
pub fn apply_bookmarks(pdf_bytes: &[u8], bookmarks: &[Bookmark]) -> Result<Vec<u8>, BookmarkError> {
    if bookmarks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let entries = resolve_entries(&mut document, bookmarks, &pages)?;

    let outlines_id = document.new_object_id();
    for (index, entry) in entries.iter().enumerate() {
        let mut item = Dictionary::new();
        item.set("Title", Object::string_literal(entry.title.as_str()));
        item.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entry.page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        item.set("Parent", Object::Reference(outlines_id));
        if index > 0 {
            item.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if let Some(next) = entries.get(index + 1) {
            item.set("Next", Object::Reference(next.object_id));
        }
        document
            .objects
            .insert(entry.object_id, Object::Dictionary(item));
    }
    attach_outline_root(&mut document, outlines_id, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct ResolvedEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn resolve_entries(
    document: &mut Document,
    bookmarks: &[Bookmark],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<ResolvedEntry>, BookmarkError> {
    bookmarks
        .iter()
        .map(|bookmark| {
            let page_ref = u32::try_from(bookmark.page)
                .ok()
                .and_then(|page| pages.get(&page).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: bookmark.title.clone(),
                    page: bookmark.page,
                })?;
            Ok(ResolvedEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: bookmark.title.clone(),
            })
        })
        .collect()
}

fn attach_outline_root(
    document: &mut Document,
    outlines_id: ObjectId,
    entries: &[ResolvedEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut root = Dictionary::new();
    root.set("Type", Object::Name("Outlines".into()));
    root.set("Count", Object::Integer(entries.len() as i64));
    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        root.set("First", Object::Reference(first.object_id));
        root.set("Last", Object::Reference(last.object_id));
    }
    document.objects.insert(outlines_id, Object::Dictionary(root));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));
    Ok(())
}
