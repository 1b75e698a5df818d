//! End-to-end tests for notation stripping and offset rewriting

use hoverdoc::{FakeProvider, Node, Pipeline, SampleOptions};

fn run(code: &str) -> hoverdoc::Sample {
    let pipeline = Pipeline::new(SampleOptions::default());
    let mut provider = FakeProvider::new();
    pipeline.run(code, "ts", &mut provider).unwrap()
}

fn run_with_tags(code: &str, tags: &[&str]) -> hoverdoc::Sample {
    let options = SampleOptions {
        custom_tags: tags.iter().map(|t| t.to_string()).collect(),
        ..SampleOptions::default()
    };
    let mut provider = FakeProvider::new();
    Pipeline::new(options).run(code, "ts", &mut provider).unwrap()
}

#[test]
fn test_plain_code_passes_through() {
    let sample = run("const a = 1\n");
    assert_eq!(sample.code, "const a = 1\n");
    assert!(sample.meta.removals.is_empty());
}

#[test]
fn test_flag_line_is_stripped() {
    let sample = run("// @strict\nconst a = 1\n");
    assert_eq!(sample.code, "const a = 1\n");
    assert_eq!(
        sample.meta.compiler_options.get("strict"),
        Some(&serde_json::Value::Bool(true))
    );
}

#[test]
fn test_cut_removes_preamble_and_shifts_nodes() {
    let sample = run("const a = \"123\"\n// ---cut---\nconst b = \"345\"\n");
    assert!(sample.code.contains("const b"));
    assert!(!sample.code.contains("const a"));

    // The hover for `b` lands at offset 6 of the final code
    let b_hover = sample
        .hovers()
        .into_iter()
        .find(|h| h.text.contains('b'))
        .expect("hover for b");
    assert_eq!(b_hover.start, 6);
}

#[test]
fn test_cut_after_truncates() {
    let sample = run("const a = 1\n// ---cut-after---\nconst b = 2\n");
    assert!(sample.code.contains("const a"));
    assert!(!sample.code.contains("const b"));
}

#[test]
fn test_cut_start_end_removes_middle() {
    let code = "const a = 1\n// ---cut-start---\nconst hidden = 0\n// ---cut-end---\nconst b = 2\n";
    let sample = run(code);
    assert!(sample.code.contains("const a"));
    assert!(sample.code.contains("const b"));
    assert!(!sample.code.contains("hidden"));
    assert_eq!(sample.code, "const a = 1\nconst b = 2\n");
}

#[test]
fn test_nested_cut_regions_remove_their_union() {
    let code = "a\n// ---cut-start---\nb\n// ---cut-start---\nc\n// ---cut-end---\nd\n// ---cut-end---\ne\n";
    let sample = run(code);
    assert_eq!(sample.code, "a\ne\n");
    assert!(!sample.code.contains("cut"));
}

#[test]
fn test_custom_tag_extracted_and_line_removed() {
    let sample = run_with_tags("// @thing: OK, sure\nconst a = 1\n", &["thing"]);
    assert_eq!(sample.code, "const a = 1\n");

    let tags = sample.tags();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "thing");
    assert_eq!(tags[0].text.as_deref(), Some("OK, sure"));
    assert_eq!(tags[0].start, 0);
}

#[test]
fn test_offset_monotonicity_invariant() {
    let code = "// @strict\nconst a = \"123\"\n// ---cut---\nconst b = \"345\"\n//    ^?\nconst c = b\n";
    let sample = run(code);
    for node in &sample.nodes {
        assert!(node.start() + node.length() <= sample.code.len());
    }
    assert!(sample
        .nodes
        .windows(2)
        .all(|w| w[0].start() <= w[1].start()));
}

#[test]
fn test_positions_resolved_against_final_code() {
    let sample = run("// @strict\nconst abc = 1\n//      ^?\n");
    let queries = sample.queries();
    assert_eq!(queries.len(), 1);
    // Final code is just the source line, so the query sits on line 0
    assert_eq!(queries[0].start, 6);
    assert_eq!(queries[0].line, 0);
    assert_eq!(queries[0].character, 6);
}

#[test]
fn test_nodes_in_removed_ranges_are_dropped() {
    // The hover nodes for identifiers on the cut-away line must not survive
    let sample = run("const gone = 1\n// ---cut---\nconst kept = 2\n");
    assert!(sample.hovers().iter().all(|h| !h.text.contains("gone")));
    assert!(matches!(sample.nodes.first(), Some(Node::Hover(_))));
}

#[test]
fn test_keep_notations_records_but_does_not_strip() {
    let code = "const a = \"123\"\n// ---cut---\nconst b = \"345\"\n//    ^?\n";
    let sample = run(&format!("// @keepNotations\n{}", code));

    assert!(sample.code.contains("---cut---"));
    assert!(sample.code.contains("@keepNotations"));
    assert!(!sample.meta.removals.is_empty());

    // The query keeps its raw offset into the unstripped text
    let queries = sample.queries();
    assert_eq!(queries.len(), 1);
    let b_offset = sample.code.find("const b").unwrap() + 6;
    assert_eq!(queries[0].start, b_offset);
    assert_eq!(queries[0].line, 3);
    assert_eq!(queries[0].character, 6);
}

#[test]
fn test_meta_positions_are_raw_offsets() {
    let code = "const abc = 1\n//      ^?\n";
    let sample = run(code);
    assert_eq!(sample.meta.position_queries, vec![6]);
    assert!(sample.meta.position_completions.is_empty());
}

#[test]
fn test_crlf_sample() {
    let sample = run("// @strict\r\nconst a = 1\r\n");
    assert_eq!(sample.code, "const a = 1\r\n");
}
