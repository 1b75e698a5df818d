//! End-to-end tests for the error taxonomy, validation switches, and the
//! showEmit / keepNotations output modes

use hoverdoc::{
    Diagnostic, DiagnosticLevel, EmittedFile, FakeProvider, HoverdocError, Pipeline,
    SampleOptions,
};

fn run(code: &str, provider: &mut FakeProvider) -> Result<hoverdoc::Sample, HoverdocError> {
    Pipeline::new(SampleOptions::default()).run(code, "ts", provider)
}

fn cannot_find_b(start: usize) -> Diagnostic {
    Diagnostic {
        start,
        length: 1,
        code: 2304,
        level: DiagnosticLevel::Error,
        message: "Cannot find name 'b'.".to_string(),
    }
}

#[test]
fn test_unknown_flag_is_fatal() {
    let err = run("// @definitelyNotAThing\nconst a = 1\n", &mut FakeProvider::new()).unwrap_err();
    assert_eq!(
        err,
        HoverdocError::UnknownFlag {
            name: "definitelyNotAThing".to_string()
        }
    );
}

#[test]
fn test_unknown_flag_downgraded_by_validation_switch() {
    let sample = run(
        "// @noErrorValidation\n// @definitelyNotAThing\nconst a = 1\n",
        &mut FakeProvider::new(),
    )
    .unwrap();
    // The line is still stripped even though the check is skipped
    assert_eq!(sample.code, "const a = 1\n");
}

#[test]
fn test_mismatched_cut_markers() {
    let err = run("// ---cut-start---\nconst a = 1\n", &mut FakeProvider::new()).unwrap_err();
    assert_eq!(err, HoverdocError::MismatchedCutMarkers { starts: 1, ends: 0 });
}

#[test]
fn test_query_into_cut_region_is_fatal() {
    let code = "const a = 1\n//    ^?\n// ---cut---\nconst b = 2\n";
    let err = run(code, &mut FakeProvider::new()).unwrap_err();
    assert_eq!(err, HoverdocError::QueryInRemovedRange { offset: 6 });
}

#[test]
fn test_highlight_into_cut_region_is_dropped_not_fatal() {
    let code = "const abc = 1\n//    ^^^ note\n// ---cut---\nconst kept = 2\n";
    let sample = run(code, &mut FakeProvider::new()).unwrap();
    assert!(sample.highlights().is_empty());
    assert_eq!(sample.meta.position_highlights, vec![6]);
    assert!(sample.code.contains("kept"));
}

#[test]
fn test_query_off_identifier_is_fatal() {
    let err = run("const a = 1\n//   ^?\n", &mut FakeProvider::new()).unwrap_err();
    assert_eq!(err, HoverdocError::InvalidQuery { line: 1 });
}

#[test]
fn test_undeclared_diagnostics_are_fatal() {
    let code = "const a = b\n";
    let mut provider = FakeProvider::new().with_diagnostics("index.ts", vec![cannot_find_b(10)]);
    let err = run(code, &mut provider).unwrap_err();
    match err {
        HoverdocError::UndeclaredErrors { expected, found } => {
            assert!(expected.is_empty());
            assert_eq!(found, vec!["[2304] Cannot find name 'b'.".to_string()]);
        }
        other => panic!("expected UndeclaredErrors, got {}", other),
    }
}

#[test]
fn test_declared_diagnostics_become_error_nodes() {
    let code = "// @errors: 2304\nconst a = b\n";
    // Offsets are file-local into the unstripped segment: `b` sits at 27
    let mut provider = FakeProvider::new().with_diagnostics("index.ts", vec![cannot_find_b(27)]);
    let sample = run(code, &mut provider).unwrap();

    assert_eq!(sample.code, "const a = b\n");
    let errors = sample.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, 2304);
    assert_eq!(errors[0].level, DiagnosticLevel::Error);
    assert_eq!(errors[0].start, 10);
    assert_eq!(errors[0].line, 0);
    assert_eq!(errors[0].character, 10);
    assert_eq!(sample.meta.handbook_options.errors, vec![2304]);
}

#[test]
fn test_no_errors_suppresses_everything() {
    let code = "// @noErrors\nconst a = b\n";
    let mut provider = FakeProvider::new().with_diagnostics("index.ts", vec![cannot_find_b(23)]);
    let sample = run(code, &mut provider).unwrap();
    assert!(sample.errors().is_empty());
}

#[test]
fn test_no_errors_with_code_list_suppresses_only_those() {
    let code = "// @noErrors: 2304\nconst a = b\n";
    let mut provider = FakeProvider::new().with_diagnostics("index.ts", vec![cannot_find_b(29)]);
    let sample = run(code, &mut provider).unwrap();
    assert!(sample.errors().is_empty());
}

#[test]
fn test_no_error_validation_keeps_undeclared_diagnostics() {
    let code = "// @noErrorValidation\nconst a = b\n";
    let mut provider = FakeProvider::new().with_diagnostics("index.ts", vec![cannot_find_b(32)]);
    let sample = run(code, &mut provider).unwrap();
    assert_eq!(sample.errors().len(), 1);
}

#[test]
fn test_no_completions_is_fatal() {
    let err = run("console.zz\n//        ^|\n", &mut FakeProvider::new()).unwrap_err();
    assert_eq!(
        err,
        HoverdocError::NoCompletions {
            prefix: "zz".to_string(),
            line: 1
        }
    );
}

#[test]
fn test_no_completions_downgraded_by_validation_switch() {
    let sample = run(
        "// @noErrorValidation\nconsole.zz\n//        ^|\n",
        &mut FakeProvider::new(),
    )
    .unwrap();
    let completions = sample.completions();
    assert_eq!(completions.len(), 1);
    assert!(completions[0].completions.is_empty());
}

#[test]
fn test_show_emit_substitutes_compiled_output() {
    let mut provider = FakeProvider::new().with_emit(
        "index.ts",
        vec![EmittedFile {
            path: "index.js".to_string(),
            text: "var a = 1;\n".to_string(),
        }],
    );
    let sample = run("// @showEmit\nconst a = 1\n", &mut provider).unwrap();

    assert_eq!(sample.code, "var a = 1;\n");
    assert!(sample.nodes.is_empty());
    assert!(sample.meta.removals.is_empty());
    assert_eq!(sample.meta.extension, "js");
}

#[test]
fn test_show_emitted_file_picks_named_output() {
    let mut provider = FakeProvider::new().with_emit(
        "index.ts",
        vec![
            EmittedFile {
                path: "index.js".to_string(),
                text: "var a = 1;\n".to_string(),
            },
            EmittedFile {
                path: "index.d.ts".to_string(),
                text: "declare const a: number;\n".to_string(),
            },
        ],
    );
    let sample = run(
        "// @showEmit\n// @showEmittedFile: index.d.ts\nconst a = 1\n",
        &mut provider,
    )
    .unwrap();

    assert_eq!(sample.code, "declare const a: number;\n");
    assert_eq!(sample.meta.extension, "ts");
}

#[test]
fn test_show_emit_target_missing_is_fatal() {
    let err = run("// @showEmit\nconst a = 1\n", &mut FakeProvider::new()).unwrap_err();
    assert_eq!(
        err,
        HoverdocError::EmitFileNotFound {
            path: "index.js".to_string()
        }
    );
}

#[test]
fn test_show_emit_conflicts_with_keep_notations() {
    let err = run(
        "// @showEmit\n// @keepNotations\nconst a = 1\n",
        &mut FakeProvider::new(),
    )
    .unwrap_err();
    assert_eq!(err, HoverdocError::EmitConflictsWithKeepNotations);
}

#[test]
fn test_invalid_enum_option_value() {
    let err = run("// @target: es2099\nconst a = 1\n", &mut FakeProvider::new()).unwrap_err();
    assert!(matches!(err, HoverdocError::InvalidEnumOption { .. }));
}

#[test]
fn test_invalid_primitive_coercion() {
    let err = run(
        "// @maxNodeModuleJsDepth: lots\nconst a = 1\n",
        &mut FakeProvider::new(),
    )
    .unwrap_err();
    assert!(matches!(err, HoverdocError::InvalidOptionValue { .. }));
}

#[test]
fn test_no_errors_cutted_drops_diagnostics_in_cut_regions() {
    let code = "// @errors: 2304\n// @noErrorsCutted\nconst x = b\n// ---cut---\nconst a = b\n";
    // One diagnostic in the cut preamble, one in the kept tail
    let preamble_b = code.find("x = b").unwrap() + 4;
    let kept_b = code.rfind("a = b").unwrap() + 4;
    let mut provider = FakeProvider::new()
        .with_diagnostics("index.ts", vec![cannot_find_b(preamble_b), cannot_find_b(kept_b)]);
    let sample = run(code, &mut provider).unwrap();

    assert_eq!(sample.code, "const a = b\n");
    let errors = sample.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].start, 10);
}
