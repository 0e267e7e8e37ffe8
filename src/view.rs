// Terminal presenter: a checklist or a JSON array per refresh

use crate::controller::Presenter;
use crate::task::TaskView;
use colored::Colorize;
use eyre::Result;
use std::io::Write;

/// How a refresh is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Checklist with `[x]`/`[ ]` markers
    Pretty,
    /// One JSON array per refresh
    Json,
}

/// `Presenter` writing to any `io::Write`
pub struct TerminalView<W: Write> {
    out: W,
    mode: OutputMode,
    color: bool,
    input: String,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            color: false,
            input: String::new(),
        }
    }

    /// Enable ANSI styling in pretty mode
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Text currently held in the input line
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input.clear();
        self.input.push_str(text);
    }

    /// Write a one-line diagnostic; suppressed in JSON mode
    pub fn notice(&mut self, message: &str) -> Result<()> {
        if self.mode == OutputMode::Json {
            return Ok(());
        }
        if self.color {
            writeln!(self.out, "{}", message.yellow())?;
        } else {
            writeln!(self.out, "{}", message)?;
        }
        Ok(())
    }

    /// Write the interactive prompt; nothing in JSON mode
    pub fn prompt(&mut self) -> Result<()> {
        if self.mode == OutputMode::Pretty {
            write!(self.out, "> ")?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_pretty(&mut self, tasks: &[TaskView]) -> Result<()> {
        if tasks.is_empty() {
            let line = "No tasks yet.";
            if self.color {
                writeln!(self.out, "{}", line.dimmed())?;
            } else {
                writeln!(self.out, "{}", line)?;
            }
            return Ok(());
        }

        let width = tasks.iter().map(|t| t.id.to_string().len()).max().unwrap_or(1);

        for task in tasks {
            let done = task.status.is_complete();
            let marker = if done { "[x]" } else { "[ ]" };

            if self.color {
                let marker = if done { marker.green() } else { marker.normal() };
                let text = if done {
                    task.text.as_str().dimmed().strikethrough()
                } else {
                    task.text.as_str().normal()
                };
                writeln!(self.out, "{:>width$}. {} {}", task.id, marker, text, width = width)?;
            } else {
                writeln!(self.out, "{:>width$}. {} {}", task.id, marker, task.text, width = width)?;
            }
        }

        Ok(())
    }

    fn render_json(&mut self, tasks: &[TaskView]) -> Result<()> {
        serde_json::to_writer(&mut self.out, tasks)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalView<W> {
    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn show(&mut self, tasks: &[TaskView]) -> Result<()> {
        match self.mode {
            OutputMode::Pretty => self.render_pretty(tasks)?,
            OutputMode::Json => self.render_json(tasks)?,
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn views() -> Vec<TaskView> {
        vec![
            TaskView {
                id: 1,
                text: "Buy milk".to_string(),
                status: TaskStatus::Incomplete,
            },
            TaskView {
                id: 12,
                text: "Walk dog".to_string(),
                status: TaskStatus::Complete,
            },
        ]
    }

    fn rendered(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn test_pretty_checklist() {
        let mut view = TerminalView::new(Vec::new(), OutputMode::Pretty);
        view.show(&views()).unwrap();

        assert_eq!(rendered(view), " 1. [ ] Buy milk\n12. [x] Walk dog\n");
    }

    #[test]
    fn test_pretty_empty_list() {
        let mut view = TerminalView::new(Vec::new(), OutputMode::Pretty);
        view.show(&[]).unwrap();

        assert_eq!(rendered(view), "No tasks yet.\n");
    }

    #[test]
    fn test_json_output() {
        let mut view = TerminalView::new(Vec::new(), OutputMode::Json);
        view.show(&views()).unwrap();

        let out = rendered(view);
        let parsed: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(parsed[0]["text"], "Buy milk");
        assert_eq!(parsed[0]["status"], "incomplete");
        assert_eq!(parsed[1]["id"], 12);
        assert_eq!(parsed[1]["status"], "complete");
    }

    #[test]
    fn test_each_refresh_replaces_output() {
        let mut view = TerminalView::new(Vec::new(), OutputMode::Json);
        view.show(&views()).unwrap();
        view.show(&[]).unwrap();

        let out = rendered(view);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "[]");
    }

    #[test]
    fn test_clear_input() {
        let mut view = TerminalView::new(Vec::new(), OutputMode::Pretty);
        view.set_input("Buy milk");
        assert_eq!(view.input(), "Buy milk");

        view.clear_input();
        assert_eq!(view.input(), "");
    }

    #[test]
    fn test_notice_suppressed_in_json_mode() {
        let mut view = TerminalView::new(Vec::new(), OutputMode::Json);
        view.notice("This task already exists.").unwrap();
        assert!(rendered(view).is_empty());

        let mut view = TerminalView::new(Vec::new(), OutputMode::Pretty);
        view.notice("This task already exists.").unwrap();
        assert_eq!(rendered(view), "This task already exists.\n");
    }
}
