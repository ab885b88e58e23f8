//! Batch processing over a temporary unpacked source directory.

use std::fs;
use std::path::Path;

use entitle::process_directory;

const OPF: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
	<manifest>
		<item href="css/core.css" id="core.css" media-type="text/css"/>
		<item href="text/titlepage.xhtml" id="titlepage.xhtml" media-type="application/xhtml+xml"/>
		<item href="text/chapter-1.xhtml" id="chapter-1.xhtml" media-type="application/xhtml+xml"/>
		<item href="text/dedication.xhtml" id="dedication.xhtml" media-type="application/xhtml+xml"/>
		<item href="text/chapter-2.xhtml" id="chapter-2.xhtml" media-type="application/xhtml+xml"/>
	</manifest>
	<spine>
		<itemref idref="titlepage.xhtml"/>
		<itemref idref="dedication.xhtml"/>
		<itemref idref="chapter-1.xhtml"/>
		<itemref idref="chapter-2.xhtml"/>
	</spine>
</package>"#;

fn content(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>placeholder</title></head>
<body>{body}</body>
</html>"#
    )
}

fn write_source(root: &Path) {
    let text_dir = root.join("src/epub/text");
    fs::create_dir_all(&text_dir).unwrap();
    fs::write(root.join("src/epub/content.opf"), OPF).unwrap();

    // Excluded by name; never touched.
    fs::write(
        text_dir.join("titlepage.xhtml"),
        content("<h1>My Book</h1>"),
    )
    .unwrap();
    // No h2-h6 heading: skipped, not failed.
    fs::write(
        text_dir.join("dedication.xhtml"),
        content("<section epub:type=\"dedication\"><p>For E.</p></section>"),
    )
    .unwrap();
    fs::write(
        text_dir.join("chapter-1.xhtml"),
        content(concat!(
            "<section epub:type=\"chapter\">",
            "<h2 epub:type=\"ordinal z3998:roman\">I</h2>",
            "<p>Call me Ishmael.</p>",
            "</section>"
        )),
    )
    .unwrap();
    // Malformed numeral: fails, but must not abort the batch.
    fs::write(
        text_dir.join("chapter-2.xhtml"),
        content(concat!(
            "<section epub:type=\"chapter\">",
            "<h2><span epub:type=\"z3998:roman\">two</span></h2>",
            "</section>"
        )),
    )
    .unwrap();
}

#[test]
fn test_in_place_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path());

    let report = process_directory(dir.path(), true).unwrap();

    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.processed[0].file, "chapter-1.xhtml");
    assert_eq!(report.processed[0].title, "Chapter 1");
    assert_eq!(report.processed[0].id, "chapter-1");
    assert!(report.processed[0].xhtml.is_none());

    assert_eq!(report.skipped, vec!["dedication.xhtml".to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file, "chapter-2.xhtml");
    assert!(report.failures[0].error.contains("Roman"));

    // The processed file was rewritten on disk.
    let rewritten = fs::read_to_string(dir.path().join("src/epub/text/chapter-1.xhtml")).unwrap();
    assert!(rewritten.contains("<title>Chapter 1</title>"));
    assert!(rewritten.contains(r#"<section epub:type="chapter" id="chapter-1">"#));
    assert!(rewritten.contains("Call me Ishmael."));

    // Excluded and failed files keep their original bytes.
    let untouched = fs::read_to_string(dir.path().join("src/epub/text/titlepage.xhtml")).unwrap();
    assert!(untouched.contains("<title>placeholder</title>"));
    let failed = fs::read_to_string(dir.path().join("src/epub/text/chapter-2.xhtml")).unwrap();
    assert!(failed.contains("<title>placeholder</title>"));
}

#[test]
fn test_stdout_batch_returns_markup() {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path());

    let report = process_directory(dir.path(), false).unwrap();

    let xhtml = report.processed[0].xhtml.as_deref().unwrap();
    assert!(xhtml.contains("<title>Chapter 1</title>"));

    // Nothing was written back.
    let on_disk = fs::read_to_string(dir.path().join("src/epub/text/chapter-1.xhtml")).unwrap();
    assert!(on_disk.contains("<title>placeholder</title>"));
}

#[test]
fn test_all_failures_counts_as_zero_successes() {
    let dir = tempfile::tempdir().unwrap();
    let text_dir = dir.path().join("src/epub/text");
    fs::create_dir_all(&text_dir).unwrap();
    let opf = concat!(
        r#"<package><manifest>"#,
        r#"<item href="text/chapter-1.xhtml" id="c1" media-type="application/xhtml+xml"/>"#,
        r#"</manifest><spine><itemref idref="c1"/></spine></package>"#
    );
    fs::write(dir.path().join("src/epub/content.opf"), opf).unwrap();
    fs::write(
        text_dir.join("chapter-1.xhtml"),
        content(concat!(
            "<section epub:type=\"chapter\">",
            "<h2><span epub:type=\"z3998:roman\">nope</span></h2>",
            "</section>"
        )),
    )
    .unwrap();

    let report = process_directory(dir.path(), false).unwrap();

    // A batch where every file fails has zero successes, even though the
    // report itself is not empty.
    assert!(report.no_successes());
    assert!(report.processed.is_empty());
    assert_eq!(report.failures.len(), 1);
}

#[test]
fn test_missing_opf_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(process_directory(dir.path(), false).is_err());
}
