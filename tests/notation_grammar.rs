//! Parameterized cases pinning down the exact directive grammar

use rstest::rstest;

use hoverdoc::notation::{scan, CutKind, MarkerKind};

#[rstest]
#[case("// ---cut---\n", CutKind::Cut)]
#[case("//---cut---\n", CutKind::Cut)]
#[case("  // ---cut---\n", CutKind::Cut)]
#[case("\t// ---cut---\n", CutKind::Cut)]
#[case("// ---cut-after---\n", CutKind::CutAfter)]
#[case("   // ---cut-after---   \n", CutKind::CutAfter)]
fn cut_markers_with_whitespace(#[case] line: &str, #[case] expected: CutKind) {
    let out = scan(line).unwrap();
    assert_eq!(out.cuts.len(), 1);
    assert_eq!(out.cuts[0].kind, expected);
}

#[rstest]
#[case("// ---cut--- \n")]
#[case("// --cut--\n")]
#[case("// ---CUT---\n")]
#[case("x // ---cut---\n")]
fn near_miss_cut_lines_are_code(#[case] line: &str) {
    let out = scan(line).unwrap();
    // "// ---cut--- " with a trailing space still matches; everything else
    // here must be left alone
    if line == "// ---cut--- \n" {
        assert_eq!(out.cuts.len(), 1);
    } else {
        assert!(out.cuts.is_empty());
    }
}

#[rstest]
#[case("// @strict\n", "strict", None)]
#[case("// @errors: 2304\n", "errors", Some("2304"))]
#[case("//@strict\n", "strict", None)]
#[case("// @lib: dom, es2015\n", "lib", Some("dom, es2015"))]
#[case("// @strict:\n", "strict", None)]
fn flag_lines(#[case] line: &str, #[case] name: &str, #[case] value: Option<&str>) {
    let out = scan(line).unwrap();
    assert_eq!(out.flags.len(), 1);
    assert_eq!(out.flags[0].name, name);
    assert_eq!(out.flags[0].value.as_deref(), value);
}

#[rstest]
#[case("  // @strict\n")]
#[case("// @my-flag\n")]
#[case("// @strict extra\n")]
#[case("const a = 1 // @strict\n")]
fn near_miss_flag_lines_are_code(#[case] line: &str) {
    let out = scan(line).unwrap();
    assert!(out.flags.is_empty());
}

#[rstest]
#[case("//  ^?\n", MarkerKind::Query)]
#[case("//  ^|\n", MarkerKind::Completion)]
#[case("//  ^^^^\n", MarkerKind::Highlight { caret_len: 4 })]
#[case("    //  ^?\n", MarkerKind::Query)]
fn annotation_markers(#[case] line: &str, #[case] expected: MarkerKind) {
    let out = scan(line).unwrap();
    assert_eq!(out.markers.len(), 1);
    assert_eq!(out.markers[0].kind, expected);
}

#[test]
fn directive_line_is_fully_consumed() {
    let out = scan("// @errors: 2304 7027\n").unwrap();
    assert_eq!(out.flags[0].start, 0);
    assert_eq!(out.flags[0].end, 22);
}
