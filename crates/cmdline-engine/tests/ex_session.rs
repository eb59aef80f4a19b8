mod common;

use cmdline_config::Config;
use cmdline_engine::{
    CommandLine, CommandLineContext, CommandLineKind, EditorMode, ExSession, RegisterContent,
};
use cmdline_search::{SearchDirection, SearchState};
use cmdline_text::Position;
use common::{FailingEngine, FixedEngine, MockHost};

fn ctx() -> CommandLineContext {
    CommandLineContext::new(Config::default(), None)
}

#[test]
fn substitute_replaces_first_match_on_current_line() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["aaa"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/a/b/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["baa"]);
    assert_eq!(host.editor.dot_repeatable, Some(true));
}

#[test]
fn substitute_global_flag_replaces_all_occurrences() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["aaa"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/a/b/g");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["bbb"]);
}

#[test]
fn percent_range_substitutes_whole_buffer() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["foo", "bar", "foo foo"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "%s/foo/qux/g");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["qux", "bar", "qux qux"]);
    assert_eq!(
        host.status.last(),
        Some(&("3 substitutions on 2 lines".to_string(), false))
    );
    // Cursor rests on the last changed line.
    assert_eq!(host.editor.cursor, Position::new(2, 0));
}

#[test]
fn explicit_range_limits_substitution() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["a", "a", "a"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "1,2s/a/b/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["b", "b", "a"]);
}

#[test]
fn substitutions_within_report_threshold_stay_silent() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["a", "a", "a"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "1,2s/a/b/");
    session.run(&mut ctx, &mut host.borrow());
    // Two substitutions do not cross the default 'report' value of 2.
    assert_eq!(host.editor.lines, ["b", "b", "a"]);
    assert!(host.status.messages.is_empty());
}

#[test]
fn substitute_capture_groups() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["foo"]);
    let mut session = ExSession::with_text(EditorMode::Normal, r"s/(f)oo/\1x/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["fx"]);
}

#[test]
fn substitute_ampersand_reinserts_match() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["ab"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/ab/[&]/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["[ab]"]);
}

#[test]
fn substitute_without_match_reports_e486() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["hello"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/xyz/a/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["hello"]);
    assert_eq!(
        host.status.last(),
        Some(&("E486: Pattern not found: xyz".to_string(), true))
    );
}

#[test]
fn empty_pattern_reuses_last_search() {
    let mut ctx = ctx();
    let mut last = SearchState::new(SearchDirection::Forward, Position::origin());
    last.set_pattern("a");
    ctx.set_last_search(last);

    let mut host = MockHost::new(&["aaa"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s//b/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.lines, ["baa"]);
}

#[test]
fn empty_pattern_without_last_search_reports_e35() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["aaa"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s//b/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(
        host.status.last(),
        Some(&("E35: No previous regular expression".to_string(), true))
    );
}

#[test]
fn unknown_command_reports_e492() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["x"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "frobnicate");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(
        host.status.last(),
        Some(&("E492: Not an editor command: frobnicate".to_string(), true))
    );
    // Failed commands still enter history.
    assert_eq!(ctx.history_entries(CommandLineKind::Ex), ["frobnicate"]);
}

#[test]
fn unknown_command_falls_back_to_external_engine() {
    let (engine, log) = FixedEngine::answering("written plugin.vim");
    let mut ctx = ctx();
    let mut host = MockHost::with_engine(&["x"], Box::new(engine));
    let mut session = ExSession::with_text(EditorMode::Normal, "PluginInstall");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(*log.borrow(), ["PluginInstall"]);
    assert_eq!(
        host.status.last(),
        Some(&("written plugin.vim".to_string(), false))
    );
}

#[test]
fn capable_command_prefers_external_engine() {
    let (engine, log) = FixedEngine::answering("1 substitution");
    let mut ctx = ctx();
    let mut host = MockHost::with_engine(&["aaa"], Box::new(engine));
    let mut session = ExSession::with_text(EditorMode::Normal, "s/a/b/");
    session.run(&mut ctx, &mut host.borrow());
    // Delegated, so the local implementation never touched the buffer.
    assert_eq!(host.editor.lines, ["aaa"]);
    assert_eq!(*log.borrow(), ["s/a/b/"]);
}

#[test]
fn engine_failure_is_swallowed() {
    let mut ctx = ctx();
    let mut host = MockHost::with_engine(&["x"], Box::new(FailingEngine));
    let mut session = ExSession::with_text(EditorMode::Normal, "frobnicate");
    session.run(&mut ctx, &mut host.borrow());
    // Logged, not shown and not panicked.
    assert!(host.status.messages.is_empty());
}

#[test]
fn executed_line_lands_in_colon_register_as_keys() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["aaa"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/a/b/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(
        host.registers.get(':'),
        Some(&RegisterContent::Keys("s/a/b/".chars().collect()))
    );
}

#[test]
fn register_command_does_not_overwrite_colon_register() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["x"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "reg");
    session.run(&mut ctx, &mut host.borrow());
    assert!(host.registers.get(':').is_none());
    assert_eq!(host.editor.dot_repeatable, Some(false));
}

#[test]
fn bare_line_number_moves_cursor() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["a", "b", "c"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "3");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.cursor, Position::new(2, 0));
}

#[test]
fn nohlsearch_clears_highlight_flag() {
    let mut ctx = ctx();
    ctx.set_highlight_matches(true);
    let mut host = MockHost::new(&["x"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "noh");
    session.run(&mut ctx, &mut host.borrow());
    assert!(!ctx.highlight_matches());
}

#[test]
fn run_restores_previous_mode() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["aaa"]);
    host.editor.mode = EditorMode::CommandLineInProgress;
    let mut session = ExSession::with_text(EditorMode::Visual, "s/a/b/");
    session.run(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.mode, EditorMode::Visual);
}

#[test]
fn escape_restores_mode_and_records_history() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["x"]);
    host.editor.mode = EditorMode::CommandLineInProgress;
    let mut session = ExSession::with_text(EditorMode::Normal, "wq");
    session.escape(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.mode, EditorMode::Normal);
    assert_eq!(ctx.history_entries(CommandLineKind::Ex), ["wq"]);
}

#[test]
fn escape_with_empty_text_records_nothing() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["x"]);
    let mut session = ExSession::new(EditorMode::Normal);
    session.escape(&mut ctx, &mut host.borrow());
    assert!(ctx.history_entries(CommandLineKind::Ex).is_empty());
}

#[test]
fn backspace_on_empty_line_dismisses_session() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["x"]);
    host.editor.mode = EditorMode::CommandLineInProgress;
    let mut session = ExSession::new(EditorMode::Normal);
    session.backspace(&mut ctx, &mut host.borrow());
    assert_eq!(host.editor.mode, EditorMode::Normal);
}

#[test]
fn substitute_preview_decorations_while_typing() {
    let ctx = ctx();
    let mut host = MockHost::new(&["foo bar", "foo"]);
    host.editor.mode = EditorMode::CommandLineInProgress;
    let session = ExSession::with_text(EditorMode::Normal, "%s/foo/XY/");
    let decorations = session.decorations(&ctx, &host.editor).unwrap();
    assert_eq!(decorations.substitution_replace.len(), 2);
    assert_eq!(decorations.substitution_append.len(), 2);
    // Preview text is bracketed in zero-width spaces so it is not trimmed.
    assert_eq!(
        decorations.substitution_append[0].after.as_deref(),
        Some("\u{200b}XY\u{200b}")
    );
    assert!(decorations.search_highlight.is_empty());
}

#[test]
fn non_substitute_commands_have_no_decorations() {
    let ctx = ctx();
    let mut host = MockHost::new(&["foo"]);
    host.editor.mode = EditorMode::CommandLineInProgress;
    let session = ExSession::with_text(EditorMode::Normal, "reg");
    assert!(session.decorations(&ctx, &host.editor).is_none());
}

#[test]
fn ex_history_persists_across_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = CommandLineContext::new(Config::default(), Some(dir.path()));
    let mut host = MockHost::new(&["aaa"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/a/b/");
    session.run(&mut first, &mut host.borrow());

    let second = CommandLineContext::new(Config::default(), Some(dir.path()));
    assert_eq!(second.history_entries(CommandLineKind::Ex), ["s/a/b/"]);
}

#[test]
fn ctrl_f_hands_off_to_host_editor() {
    let mut ctx = ctx();
    let mut host = MockHost::new(&["x"]);
    let mut session = ExSession::with_text(EditorMode::Normal, "s/par");
    session.ctrl_f(&mut ctx, &mut host.borrow());
    assert_eq!(host.picker.ex_editor_opened_with.as_deref(), Some("s/par"));
}
