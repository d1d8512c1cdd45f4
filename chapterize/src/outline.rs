//! PDF outline resolution: map bookmark entries to chapter page ranges.

use lopdf::{Dictionary, Document, Object, ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Characters that are stripped from outline titles before they become
/// filenames. Word characters, whitespace, and hyphens survive.
static TITLE_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Upper bound on outline entries walked, guarding against cyclic
/// sibling chains in malformed documents.
const MAX_OUTLINE_ENTRIES: usize = 4096;

/// Upper bound on reference chains and name-tree recursion.
const MAX_DEPTH: usize = 32;

/// A contiguous run of pages belonging to one outline entry.
///
/// Page indices are zero-based and inclusive on both ends. The title has
/// already been sanitized into a filename-safe stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub start_page: usize,
    pub end_page: usize,
}

/// Resolve a document's outline into an ordered list of chapters.
///
/// Chapters are emitted in outline order, not re-sorted by page number.
/// Documents without a usable outline collapse to a single chapter
/// covering every page.
pub fn resolve_chapters(doc: &Document) -> Vec<Chapter> {
    let pages = doc.get_pages();
    let page_count = pages.len();

    // Reverse mapping from page object id to zero-based index, so each
    // destination resolves in O(1).
    let page_index: HashMap<ObjectId, usize> = pages
        .values()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    let entries = collect_entries(doc, &page_index);
    if entries.is_empty() {
        eprintln!("No table of contents found. Treating entire PDF as one chapter.");
        return vec![whole_document_chapter(page_count)];
    }

    assign_page_ranges(entries, page_count)
}

/// Sanitize an outline title into a filename stem: strip punctuation,
/// trim, and replace spaces with underscores.
pub fn sanitize_title(title: &str) -> String {
    TITLE_STRIP
        .replace_all(title, "")
        .trim()
        .replace(' ', "_")
}

/// The fallback chapter used when the outline is missing or empty.
fn whole_document_chapter(page_count: usize) -> Chapter {
    Chapter {
        title: "Chapter1".to_string(),
        start_page: 0,
        end_page: page_count.saturating_sub(1),
    }
}

/// Compute end pages from consecutive start pages: each chapter runs up
/// to the page before the next chapter's start, and the last chapter runs
/// to the end of the document.
///
/// Entries are assumed to ascend in start page. When they do not, the
/// resulting ranges can overlap; the overlap is flagged but the entries
/// are not re-sorted.
fn assign_page_ranges(entries: Vec<(String, usize)>, page_count: usize) -> Vec<Chapter> {
    let last_page = page_count.saturating_sub(1);
    let starts: Vec<usize> = entries.iter().map(|(_, start)| *start).collect();

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (title, start_page))| {
            let end_page = match starts.get(i + 1) {
                Some(&next_start) => {
                    if next_start <= start_page {
                        log::warn!(
                            "outline entry {:?} starts at page {} but the next entry starts at page {}; chapter ranges may overlap",
                            title,
                            start_page,
                            next_start
                        );
                    }
                    next_start.saturating_sub(1)
                }
                None => last_page,
            };
            Chapter {
                title,
                start_page,
                end_page,
            }
        })
        .collect()
}

/// Walk the top level of the outline tree and collect (sanitized title,
/// start page) pairs. Nested outline levels and entries without a title
/// are skipped; entries whose destination cannot be resolved start at
/// page 0.
fn collect_entries(doc: &Document, page_index: &HashMap<ObjectId, usize>) -> Vec<(String, usize)> {
    let Ok(catalog) = doc.catalog() else {
        return Vec::new();
    };
    let Ok(outlines) = catalog.get(b"Outlines") else {
        return Vec::new();
    };
    let Object::Dictionary(root) = follow(doc, outlines) else {
        return Vec::new();
    };

    let named = named_destinations(doc);

    let mut entries = Vec::new();
    let mut item = root.get(b"First").ok().map(|obj| follow(doc, obj));
    let mut walked = 0usize;

    while let Some(Object::Dictionary(dict)) = item {
        walked += 1;
        if walked > MAX_OUTLINE_ENTRIES {
            log::warn!("outline sibling chain exceeds {MAX_OUTLINE_ENTRIES} entries; stopping");
            break;
        }

        if let Some(title) = raw_title(doc, dict) {
            if !title.is_empty() {
                let start = match start_page(doc, dict, &named, page_index) {
                    Some(page) => page,
                    None => {
                        log::debug!("could not resolve destination for {title:?}; defaulting to page 0");
                        0
                    }
                };
                entries.push((sanitize_title(&title), start));
            }
        }

        item = dict.get(b"Next").ok().map(|obj| follow(doc, obj));
    }

    entries
}

/// Follow reference chains until a direct object is reached. Broken
/// references yield the reference object itself, which downstream
/// matching then rejects.
fn follow<'a>(doc: &'a Document, mut obj: &'a Object) -> &'a Object {
    for _ in 0..MAX_DEPTH {
        match obj {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => obj = next,
                Err(_) => break,
            },
            _ => break,
        }
    }
    obj
}

/// Decode an outline item's raw title string, if present.
fn raw_title(doc: &Document, item: &Dictionary) -> Option<String> {
    match follow(doc, item.get(b"Title").ok()?) {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, Latin-1
/// otherwise (a close-enough stand-in for PDFDocEncoding).
fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Resolve an outline item's start page.
///
/// The destination may live in a `Dest` entry or behind an action
/// dictionary's `D` entry, and may be expressed directly as an array or
/// indirectly as a named destination.
fn start_page(
    doc: &Document,
    item: &Dictionary,
    named: &HashMap<Vec<u8>, Object>,
    page_index: &HashMap<ObjectId, usize>,
) -> Option<usize> {
    let raw = item.get(b"Dest").ok().or_else(|| {
        match follow(doc, item.get(b"A").ok()?) {
            Object::Dictionary(action) => action.get(b"D").ok(),
            _ => None,
        }
    })?;

    match follow(doc, raw) {
        Object::Name(name) => page_of_destination(doc, named.get(name.as_slice())?, page_index),
        Object::String(name, _) => page_of_destination(doc, named.get(name.as_slice())?, page_index),
        direct => page_of_destination(doc, direct, page_index),
    }
}

/// Map a destination value to a page index. The value is either an array
/// whose first element references the target page, or a dictionary
/// wrapping such an array in a `D` entry.
fn page_of_destination(
    doc: &Document,
    dest: &Object,
    page_index: &HashMap<ObjectId, usize>,
) -> Option<usize> {
    let parts = match follow(doc, dest) {
        Object::Array(parts) => parts,
        Object::Dictionary(dict) => match follow(doc, dict.get(b"D").ok()?) {
            Object::Array(parts) => parts,
            _ => return None,
        },
        _ => return None,
    };

    match parts.first()? {
        Object::Reference(page_id) => page_index.get(page_id).copied(),
        _ => None,
    }
}

/// Collect the document's named destinations into a flat lookup table.
///
/// Covers both the name tree under the catalog's `Names` entry and the
/// legacy flat `Dests` dictionary.
fn named_destinations(doc: &Document) -> HashMap<Vec<u8>, Object> {
    let mut map = HashMap::new();
    let Ok(catalog) = doc.catalog() else {
        return map;
    };

    if let Ok(names) = catalog.get(b"Names") {
        if let Object::Dictionary(names) = follow(doc, names) {
            if let Ok(dests) = names.get(b"Dests") {
                collect_name_tree(doc, follow(doc, dests), &mut map, 0);
            }
        }
    }

    if let Ok(dests) = catalog.get(b"Dests") {
        if let Object::Dictionary(dict) = follow(doc, dests) {
            for (key, value) in dict.iter() {
                map.entry(key.clone())
                    .or_insert_with(|| follow(doc, value).clone());
            }
        }
    }

    map
}

/// Recursively flatten a name tree node's `Names` pairs and `Kids`.
fn collect_name_tree(
    doc: &Document,
    node: &Object,
    map: &mut HashMap<Vec<u8>, Object>,
    depth: usize,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let Object::Dictionary(node) = node else {
        return;
    };

    if let Ok(Object::Array(pairs)) = node.get(b"Names").map(|obj| follow(doc, obj)) {
        for pair in pairs.chunks_exact(2) {
            let key = match &pair[0] {
                Object::String(bytes, _) => bytes.clone(),
                Object::Name(bytes) => bytes.clone(),
                _ => continue,
            };
            map.entry(key)
                .or_insert_with(|| follow(doc, &pair[1]).clone());
        }
    }

    if let Ok(Object::Array(kids)) = node.get(b"Kids").map(|obj| follow(doc, obj)) {
        for kid in kids {
            collect_name_tree(doc, follow(doc, kid), map, depth + 1);
        }
    }
}
