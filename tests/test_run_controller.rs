mod common;

use common::test_prelude::*;
use common::test_utils::{console, cursor_index, feed};
use e_buildconsole::e_dirstack::resolve_directory;

#[test]
fn end_to_end_make_directory_and_error() {
    let mut catalog = PatternCatalog::new();
    catalog.add(Pattern::new(
        "*",
        "make",
        PatternKind::Enter,
        r"^Entering directory '(?P<filePath>.*)'$",
    ));
    catalog.add(Pattern::new(
        "c",
        "cc",
        PatternKind::Error,
        r"^(?P<filePath>\S+):(?P<lineNumber>\d+): error: (?P<message>.*)$",
    ));
    let mut console = RunController::new(catalog, RunOptions::default(), RecordingSink::new());
    console.start_run();

    assert_eq!(
        console.on_line("/work", "Entering directory '/src/lib'", true),
        PatternKind::Enter
    );
    assert_eq!(
        console.on_line("/work", "main.c:10: error: missing semicolon", true),
        PatternKind::Error
    );

    assert_eq!(console.run_state().directories.entries(), ["/src/lib"]);
    assert_eq!(console.errors().count(), 1);
    assert_eq!(console.warnings().count(), 0);
    let (_, error) = console.errors().iter_depth_first().next().unwrap();
    assert_eq!(error.directory, "/src/lib");
    assert_eq!(error.file_path, "main.c");
    assert_eq!(error.line, 10);
    assert_eq!(error.column, 0);
    assert_eq!(error.message, "missing semicolon");
    assert_eq!(error.source_row, Some(1));
}

#[test]
fn leave_pops_before_the_error_is_attributed() {
    let mut console = console(RunOptions::default());
    feed(
        &mut console,
        "/work",
        &[
            "Entering directory 'a'",
            "Entering directory 'b'",
            "Leaving directory 'b'",
            "x.c:1: error: boom",
        ],
    );
    let (_, error) = console.errors().iter_depth_first().next().unwrap();
    assert_eq!(error.directory, resolve_directory("/work", Some("a")));
    assert_eq!(error.file_path, "x.c");
}

#[test]
fn leave_on_empty_stack_is_harmless() {
    let mut console = console(RunOptions::default());
    feed(&mut console, "/work", &["Leaving directory 'nowhere'", "x.c:1: error: boom"]);
    let (_, error) = console.errors().iter_depth_first().next().unwrap();
    assert_eq!(error.directory, "/work");
    assert_eq!(console.message_log().len(), 2);
}

#[test]
fn indicator_budget_caps_markers_not_records() {
    let mut console = console(RunOptions::default());
    for i in 0..17 {
        console.on_line("/work", &format!("f{}.c:{}: error: e{}", i, i + 1, i), true);
    }
    assert_eq!(console.errors().count(), 17);
    assert_eq!(console.sink().indicator_count(), 16);
    assert!(console.run_state().budget.is_exhausted());
}

#[test]
fn indicator_budget_is_shared_between_errors_and_warnings() {
    let mut console = console(RunOptions::default());
    for i in 0..16 {
        console.on_line("/work", &format!("f.c:{}: error: e", i + 1), true);
    }
    console.on_line("/work", "f.c:99: warning: late", true);
    assert_eq!(console.warnings().count(), 1);
    assert_eq!(console.sink().indicator_count(), 16);
}

#[test]
fn indicators_carry_the_absolute_file_and_kind() {
    let mut console = console(RunOptions::default());
    feed(
        &mut console,
        "/work",
        &["Entering directory '/src'", "a.c:3: warning: hmm"],
    );
    let marker = console
        .sink()
        .events
        .iter()
        .find(|e| matches!(e, SinkEvent::PlaceIndicator { .. }))
        .cloned()
        .unwrap();
    let expected_file = e_buildconsole::e_dirstack::absolute_file("/src", "a.c");
    assert_eq!(
        marker,
        SinkEvent::PlaceIndicator {
            file_path: expected_file.to_string_lossy().into_owned(),
            line: 3,
            color_rgba: RunOptions::default().warning_color,
            indicator: e_buildconsole::e_sink::WARNING_INDICATOR,
        }
    );
}

#[test]
fn disabled_indicators_request_nothing() {
    let options = RunOptions {
        indicators: false,
        ..RunOptions::default()
    };
    let mut console = console(options);
    feed(&mut console, "/work", &["a.c:1: error: x"]);
    assert_eq!(console.sink().indicator_count(), 0);
    assert_eq!(console.run_state().budget.used(), 0);
}

#[test]
fn orphan_extension_is_logged_but_not_stored() {
    let mut console = console(RunOptions::default());
    assert_eq!(
        console.on_line("/work", "   note: nothing before me", true),
        PatternKind::Extension
    );
    assert_eq!(console.errors().total(), 0);
    assert_eq!(console.warnings().total(), 0);
    assert_eq!(console.message_log().len(), 1);
    let row = &console.message_log().rows()[0];
    assert_eq!(row.tag, RowTag::Plain);
    assert!(row.diagnostic.is_none());
}

#[test]
fn extensions_attach_to_the_latest_diagnostic_of_either_tree() {
    let mut console = console(RunOptions::default());
    feed(
        &mut console,
        "/work",
        &[
            "a.c:1: error: first",
            "   note: about first",
            "b.c:2: warning: second",
            "   note: about second",
            "   note: more about second",
            "an unrelated line",
            "   note: still second",
        ],
    );

    let errors: Vec<_> = console
        .errors()
        .iter_depth_first()
        .map(|(_, r)| r.message.clone())
        .collect();
    assert_eq!(errors, ["first", "about first"]);

    let warnings: Vec<_> = console
        .warnings()
        .iter_depth_first()
        .map(|(_, r)| r.message.clone())
        .collect();
    assert_eq!(
        warnings,
        ["second", "about second", "more about second", "still second"]
    );
    assert_eq!(console.warnings().count(), 1);

    let tags: Vec<_> = console.message_log().rows().iter().map(|r| r.tag).collect();
    assert_eq!(
        tags,
        [
            RowTag::RawError,
            RowTag::ExtensionEcho,
            RowTag::RawWarning,
            RowTag::ExtensionEcho,
            RowTag::ExtensionEcho,
            RowTag::Plain,
            RowTag::ExtensionEcho,
        ]
    );
    let echo = console.message_log().rows()[1].diagnostic.unwrap();
    assert_eq!(echo.tree, TreeKind::Errors);
    assert_eq!(console.record(echo).unwrap().source_row, Some(1));
}

#[test]
fn navigation_clamps_at_both_ends() {
    let mut console = console(RunOptions::default());
    feed(
        &mut console,
        "/work",
        &["a.c:1: error: a", "b.c:2: error: b", "c.c:3: error: c"],
    );
    console.on_exit(2);
    assert_eq!(cursor_index(&console, TreeKind::Errors), Some(0));

    for _ in 0..5 {
        assert!(!console.previous(TreeKind::Errors));
        assert_eq!(cursor_index(&console, TreeKind::Errors), Some(0));
    }
    let moved = (0..5).filter(|_| console.next(TreeKind::Errors)).count();
    assert_eq!(moved, 2);
    assert_eq!(cursor_index(&console, TreeKind::Errors), Some(2));
}

#[test]
fn navigation_reveals_tab_row_and_source() {
    let mut console = console(RunOptions {
        auto_show_first_error: false,
        ..RunOptions::default()
    });
    feed(
        &mut console,
        "/work",
        &["some noise", "a.c:1: error: a", "b.c:7: error: b"],
    );
    console.on_exit(1);
    console.sink_mut().clear();

    assert!(console.next(TreeKind::Errors));
    assert_eq!(
        console.sink().events,
        vec![
            SinkEvent::RevealTab(TreeKind::Errors),
            SinkEvent::ScrollToRow(2),
            SinkEvent::RevealSource {
                directory: "/work".into(),
                file_path: "b.c".into(),
                line: 7,
                column: 0,
            },
        ]
    );
}

#[test]
fn navigation_on_an_empty_tree_does_nothing() {
    let mut console = console(RunOptions::default());
    console.on_exit(0);
    console.sink_mut().clear();
    assert!(!console.next(TreeKind::Warnings));
    assert!(!console.previous(TreeKind::Warnings));
    assert_eq!(console.run_state().warning_cursor.state(), CursorState::Empty);
    assert!(console.sink().events.is_empty());
}

#[test]
fn first_error_is_revealed_once_mid_stream() {
    let mut console = console(RunOptions::default());
    feed(
        &mut console,
        "/work",
        &["w.c:1: warning: early", "a.c:2: error: a", "b.c:3: error: b"],
    );
    assert!(console.run_state().first_diagnostic_shown);
    let reveals = console.sink().reveals();
    assert_eq!(reveals.len(), 1);
    assert_eq!(
        reveals[0],
        &SinkEvent::RevealSource {
            directory: "/work".into(),
            file_path: "a.c".into(),
            line: 2,
            column: 0,
        }
    );

    console.on_exit(1);
    assert_eq!(console.sink().reveals().len(), 1);
}

#[test]
fn first_warning_is_revealed_when_enabled() {
    let mut console = console(RunOptions {
        auto_show_first_warning: true,
        ..RunOptions::default()
    });
    feed(&mut console, "/work", &["w.c:4: warning: careful"]);
    assert!(console.run_state().first_diagnostic_shown);
    assert!(console
        .sink()
        .events
        .contains(&SinkEvent::RevealTab(TreeKind::Warnings)));
}

#[test]
fn nothing_is_revealed_when_auto_show_is_off() {
    let mut console = console(RunOptions {
        auto_show_first_error: false,
        auto_show_first_warning: false,
        ..RunOptions::default()
    });
    feed(&mut console, "/work", &["a.c:1: error: a", "w.c:1: warning: w"]);
    console.on_exit(1);
    assert!(console.sink().reveals().is_empty());
    assert!(!console.run_state().first_diagnostic_shown);
    assert_eq!(cursor_index(&console, TreeKind::Errors), Some(0));
    assert_eq!(cursor_index(&console, TreeKind::Warnings), Some(0));
}

#[test]
fn unparsed_output_is_plain_and_exit_is_reported() {
    let mut console = console(RunOptions::default());
    assert_eq!(
        console.on_line("/work", "a.c:1: error: a", false),
        PatternKind::None
    );
    console.on_exit(0);

    assert_eq!(console.errors().count(), 0);
    let rows = console.message_log().rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].tag, RowTag::Plain);
    assert_eq!(rows[1].tag, RowTag::Info);
    assert!(rows[1].text.contains("exit code 0"));
    assert!(console.sink().reveals().is_empty());
}

#[test]
fn activating_a_row_moves_the_cursor_to_its_diagnostic() {
    let mut console = console(RunOptions::default());
    feed(
        &mut console,
        "/work",
        &["a.c:1: error: a", "b.c:2: error: b", "   note: about b"],
    );
    console.on_exit(1);

    assert!(console.activate_row(2));
    assert_eq!(cursor_index(&console, TreeKind::Errors), Some(2));
    assert!(!console.activate_row(3));
    assert!(!console.activate_row(99));
}

#[test]
fn start_run_isolates_runs() {
    let mut console = console(RunOptions::default());
    for i in 0..20 {
        console.on_line("/work", &format!("f.c:{}: error: e", i + 1), true);
    }
    feed(
        &mut console,
        "/work",
        &["Entering directory 'deep'", "w.c:1: warning: w"],
    );
    console.on_exit(2);
    assert!(console.errors().count() > 0);

    console.start_run();

    assert_eq!(console.errors().count(), 0);
    assert_eq!(console.warnings().count(), 0);
    assert!(console.message_log().is_empty());
    let state = console.run_state();
    assert_eq!(state.budget.remaining(), 16);
    assert_eq!(state.error_cursor.state(), CursorState::Empty);
    assert_eq!(state.warning_cursor.state(), CursorState::Empty);
    assert!(state.directories.is_empty());
    assert!(state.last_insertion_target.is_none());
    assert!(!state.first_diagnostic_shown);

    assert_eq!(
        console.on_line("/work", "   note: orphan again", true),
        PatternKind::Extension
    );
    assert_eq!(console.errors().total(), 0);
}

#[test]
fn counts_are_reported_after_each_diagnostic() {
    let mut console = console(RunOptions::default());
    feed(&mut console, "/work", &["a.c:1: error: a", "w.c:1: warning: w"]);
    let counts: Vec<_> = console
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            SinkEvent::CountsChanged { errors, warnings } => Some((*errors, *warnings)),
            _ => None,
        })
        .collect();
    assert_eq!(counts, [(0, 0), (1, 0), (1, 1)]);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "on_line called before start_run")]
fn lines_before_start_run_violate_the_contract() {
    let mut console = RunController::new(
        PatternCatalog::new(),
        RunOptions::default(),
        RecordingSink::new(),
    );
    console.on_line("/work", "anything", true);
}

#[test]
fn builtin_diagnostics_without_a_file_place_no_marker() {
    let mut console = RunController::new(
        PatternCatalog::with_builtins(),
        RunOptions::default(),
        RecordingSink::new(),
    );
    console.start_run();
    feed(
        &mut console,
        "/work",
        &[
            "make: *** No rule to make target 'all'.  Stop.",
            "error[E0425]: cannot find value `y` in this scope",
            "warning: unused variable: `x`",
        ],
    );

    assert_eq!(console.errors().count(), 2);
    assert_eq!(console.warnings().count(), 1);
    assert_eq!(console.sink().indicator_count(), 0);
    assert_eq!(console.run_state().budget.used(), 0);

    let (_, stop) = console.errors().iter_depth_first().next().unwrap();
    assert_eq!(stop.file_path, "");
    assert_eq!(stop.message, "No rule to make target 'all'.  Stop.");
    assert_eq!(
        console.sink().reveals(),
        [&SinkEvent::RevealSource {
            directory: "/work".to_string(),
            file_path: String::new(),
            line: 0,
            column: 0,
        }]
    );
}
