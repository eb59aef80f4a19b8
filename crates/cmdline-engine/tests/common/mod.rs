#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use cmdline_engine::{
    EditorMode, EditorOps, EngineOutput, ExternalEngine, HostContext, PickerHost,
    RegisterContent, RegisterFile, StatusLine,
};
use cmdline_search::SearchDirection;
use cmdline_text::Position;

pub struct MockEditor {
    pub lines: Vec<String>,
    pub cursor: Position,
    pub mode: EditorMode,
    pub first_visible: usize,
    pub count: usize,
    pub dot_repeatable: Option<bool>,
}

impl MockEditor {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| (*s).to_string()).collect(),
            cursor: Position::origin(),
            mode: EditorMode::Normal,
            first_visible: 0,
            count: 1,
            dot_repeatable: None,
        }
    }
}

impl EditorOps for MockEditor {
    fn mode(&self) -> EditorMode {
        self.mode
    }
    fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }
    fn cursor(&self) -> Position {
        self.cursor
    }
    fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
    }
    fn line_count(&self) -> usize {
        self.lines.len()
    }
    fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).cloned()
    }
    fn replace_line(&mut self, index: usize, text: String) {
        self.lines[index] = text;
    }
    fn first_visible_line(&self) -> usize {
        self.first_visible
    }
    fn scroll_by(&mut self, delta: isize) {
        self.first_visible = (self.first_visible as isize + delta).max(0) as usize;
    }
    fn pending_count(&self) -> usize {
        self.count
    }
    fn set_dot_repeatable(&mut self, repeatable: bool) {
        self.dot_repeatable = Some(repeatable);
    }
}

#[derive(Default)]
pub struct MockStatus {
    pub messages: Vec<(String, bool)>,
}

impl MockStatus {
    pub fn last(&self) -> Option<&(String, bool)> {
        self.messages.last()
    }
}

impl StatusLine for MockStatus {
    fn set_text(&mut self, text: &str, is_error: bool) {
        self.messages.push((text.to_string(), is_error));
    }
}

#[derive(Default)]
pub struct MockRegisters {
    pub writes: Vec<(char, RegisterContent)>,
}

impl MockRegisters {
    pub fn get(&self, name: char) -> Option<&RegisterContent> {
        self.writes
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c)
    }
}

impl RegisterFile for MockRegisters {
    fn set_readonly(&mut self, name: char, content: RegisterContent) {
        self.writes.push((name, content));
    }
}

#[derive(Default)]
pub struct MockPicker {
    pub choice: Option<usize>,
    pub ex_editor_opened_with: Option<String>,
    pub search_picker_direction: Option<SearchDirection>,
}

impl PickerHost for MockPicker {
    fn open_ex_editor(&mut self, initial: &str) {
        self.ex_editor_opened_with = Some(initial.to_string());
    }
    fn open_search_picker(&mut self, direction: SearchDirection) {
        self.search_picker_direction = Some(direction);
    }
    fn pick(&mut self, _items: &[String]) -> Option<usize> {
        self.choice
    }
}

/// Engine that records what it was asked to run and answers with a canned
/// output. The log is shared so tests can inspect it after the engine is
/// boxed away.
pub struct FixedEngine {
    pub output: EngineOutput,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl FixedEngine {
    pub fn answering(text: &str) -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let engine = Self {
            output: EngineOutput {
                display_text: text.to_string(),
                is_error: false,
            },
            log: Rc::clone(&log),
        };
        (engine, log)
    }
}

impl ExternalEngine for FixedEngine {
    fn run(&mut self, command: &str) -> anyhow::Result<EngineOutput> {
        self.log.borrow_mut().push(command.to_string());
        Ok(self.output.clone())
    }
}

pub struct FailingEngine;

impl ExternalEngine for FailingEngine {
    fn run(&mut self, _command: &str) -> anyhow::Result<EngineOutput> {
        Err(anyhow!("engine unavailable"))
    }
}

/// All host pieces bundled, with a borrow-everything helper.
pub struct MockHost {
    pub editor: MockEditor,
    pub status: MockStatus,
    pub registers: MockRegisters,
    pub picker: MockPicker,
    pub engine: Option<Box<dyn ExternalEngine>>,
}

impl MockHost {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            editor: MockEditor::new(lines),
            status: MockStatus::default(),
            registers: MockRegisters::default(),
            picker: MockPicker::default(),
            engine: None,
        }
    }

    pub fn with_engine(lines: &[&str], engine: Box<dyn ExternalEngine>) -> Self {
        let mut host = Self::new(lines);
        host.engine = Some(engine);
        host
    }

    pub fn borrow(&mut self) -> HostContext<'_> {
        HostContext {
            editor: &mut self.editor,
            status: &mut self.status,
            registers: &mut self.registers,
            engine: self
                .engine
                .as_deref_mut()
                .map(|e| e as &mut dyn ExternalEngine),
            picker: &mut self.picker,
        }
    }
}
