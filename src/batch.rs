//! Batch processing of a book's content files in spine order.
//!
//! Reads the OPF package document of an unpacked ebook source, walks the
//! spine, and runs the titling engine over each XHTML content file. Per-file
//! failures are isolated: one bad file never aborts the rest of the batch.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::engine::derive_title_and_id;
use crate::error::{Error, Result};
use crate::util::decode_text;

/// Front and back matter that carries no chapter heading worth retitling.
const EXCLUDED_FILES: [&str; 5] = [
    "titlepage.xhtml",
    "colophon.xhtml",
    "uncopyright.xhtml",
    "imprint.xhtml",
    "halftitle.xhtml",
];

/// One spine entry resolved through the manifest.
#[derive(Debug, Clone)]
pub struct SpineItem {
    pub href: String,
    pub media_type: String,
}

/// A successfully retitled file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ProcessedFile {
    pub file: String,
    pub title: String,
    pub id: String,
    /// The updated markup, present when the file was not written in place.
    #[cfg_attr(feature = "cli", serde(skip))]
    pub xhtml: Option<String>,
}

/// A file that failed, with the failure rendered for reporting.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    /// Files with no qualifying heading, skipped rather than failed.
    pub skipped: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// True when not a single file was retitled successfully; skips and
    /// failures do not count.
    pub fn no_successes(&self) -> bool {
        self.processed.is_empty()
    }
}

/// Process every content file of an unpacked ebook source rooted at `root`.
///
/// Expects the Standard Ebooks layout: the package document at
/// `src/epub/content.opf` with content hrefs relative to `src/epub/`. With
/// `in_place` set, updated files are written back; otherwise the new markup
/// is returned in the report for the caller to print or inspect.
pub fn process_directory(root: &Path, in_place: bool) -> Result<BatchReport> {
    let epub_dir = root.join("src").join("epub");
    let opf_path = epub_dir.join("content.opf");
    let opf_bytes = fs::read(&opf_path)?;
    let spine = parse_spine(&decode_text(&opf_bytes))?;

    let mut report = BatchReport::default();
    for item in spine {
        if item.media_type != "application/xhtml+xml" {
            continue;
        }
        let path = epub_dir.join(&item.href);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| item.href.clone());
        if EXCLUDED_FILES.contains(&file_name.as_str()) {
            continue;
        }

        match process_file(&path, in_place) {
            Ok(Some(mut processed)) => {
                processed.file = file_name;
                report.processed.push(processed);
            }
            Ok(None) => report.skipped.push(file_name),
            Err(e) => report.failures.push(FileFailure {
                file: file_name,
                error: e.to_string(),
            }),
        }
    }
    Ok(report)
}

/// Run the engine over one file. Returns `Ok(None)` for the non-fatal
/// no-heading case.
fn process_file(path: &Path, in_place: bool) -> Result<Option<ProcessedFile>> {
    let bytes = fs::read(path)?;
    let xhtml = decode_text(&bytes);
    let titled = match derive_title_and_id(&xhtml) {
        Ok(titled) => titled,
        Err(Error::NoHeadingFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let xhtml = if in_place {
        fs::write(path, titled.xhtml.as_bytes())?;
        None
    } else {
        Some(titled.xhtml)
    };
    Ok(Some(ProcessedFile {
        file: String::new(),
        title: titled.title,
        id: titled.id,
        xhtml,
    }))
}

/// Parse the OPF package document into resolved spine items.
///
/// Collects the manifest (`id` -> href/media-type) and the `<itemref>` order,
/// then joins the two.
pub fn parse_spine(opf: &str) -> Result<Vec<SpineItem>> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);

    let mut manifest: HashMap<String, (String, String)> = HashMap::new();
    let mut spine_ids: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"item" => {
                    let mut id = String::new();
                    let mut href = String::new();
                    let mut media_type = String::new();
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match attr.key.as_ref() {
                            b"id" => id = value,
                            b"href" => href = value,
                            b"media-type" => media_type = value,
                            _ => {}
                        }
                    }
                    if !id.is_empty() {
                        manifest.insert(id, (href, media_type));
                    }
                }
                b"itemref" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"idref" {
                            spine_ids.push(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if spine_ids.is_empty() {
        return Err(Error::InvalidOpf("no spine itemrefs found".to_string()));
    }

    let mut items = Vec::with_capacity(spine_ids.len());
    for idref in spine_ids {
        let Some((href, media_type)) = manifest.get(&idref) else {
            return Err(Error::InvalidOpf(format!(
                "spine idref {idref:?} missing from manifest"
            )));
        };
        items.push(SpineItem {
            href: href.clone(),
            media_type: media_type.clone(),
        });
    }
    Ok(items)
}

/// Strip a namespace prefix from a qualified element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
