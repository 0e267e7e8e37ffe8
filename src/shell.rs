// Interactive event loop: one input line is one user action

use crate::controller::TaskListController;
use crate::task::{AddOutcome, DeleteOutcome, ToggleOutcome};
use crate::view::TerminalView;
use clap::{CommandFactory, Parser, Subcommand};
use eyre::Result;
use std::io::{BufRead, Write};
use tracing::debug;

/// A task action, shared by the command line and the shell
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a task
    #[command(visible_alias = "a")]
    Add {
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Toggle a task between done and not done
    #[command(visible_aliases = ["t", "done"])]
    Toggle { id: i64 },

    /// Delete a task
    #[command(visible_aliases = ["rm", "del", "delete"])]
    Remove { id: i64 },

    /// Show all tasks
    #[command(visible_alias = "ls")]
    List,
}

/// Everything that can be typed at the shell prompt
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    #[command(flatten)]
    Task(Command),

    /// Leave the shell
    #[command(visible_aliases = ["q", "exit"])]
    Quit,
}

#[derive(Parser, Debug)]
#[command(name = "todolist", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Parse one input line; blank lines yield `None`
///
/// `help` and malformed lines come back as a clap error whose text is meant
/// for the user.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }

    let parsed = ShellLine::try_parse_from(words)?;
    Ok(Some(parsed.command))
}

/// Help text listing the shell commands
pub fn help() -> String {
    ShellLine::command().render_help().to_string()
}

/// Reads commands from `input` until `quit` or end of input
pub struct Shell {
    interactive: bool,
}

impl Shell {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Run the loop; store errors end it and are returned
    pub fn run<R, W>(&self, controller: &mut TaskListController<'_, TerminalView<W>>, input: R) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        controller.refresh()?;

        let mut lines = input.lines();
        loop {
            if self.interactive {
                controller.presenter_mut().prompt()?;
            }

            let Some(line) = lines.next() else {
                debug!("End of input");
                break;
            };
            let line = line?;

            let command = match parse_line(&line) {
                Ok(Some(ShellCommand::Task(command))) => command,
                Ok(Some(ShellCommand::Quit)) => break,
                Ok(None) => continue,
                Err(e) => {
                    controller.presenter_mut().notice(e.to_string().trim_end())?;
                    continue;
                }
            };

            debug!(?command, "Dispatching command");
            execute(controller, command)?;
        }

        Ok(())
    }
}

/// Apply one command and report soft outcomes through the view
pub fn execute<W: Write>(controller: &mut TaskListController<'_, TerminalView<W>>, command: Command) -> Result<()> {
    match command {
        Command::Add { text } => {
            let text = text.join(" ");
            controller.presenter_mut().set_input(&text);
            let message = match controller.add(&text)? {
                AddOutcome::Added => "Task added.",
                AddOutcome::Duplicate => "This task already exists.",
                AddOutcome::Rejected => "Task cannot be empty!",
            };
            controller.presenter_mut().notice(message)?;
        }
        Command::Toggle { id } => {
            if controller.toggle(id)? == ToggleOutcome::NotFound {
                controller.presenter_mut().notice(&format!("No task with id {}.", id))?;
            }
        }
        Command::Remove { id } => {
            let message = match controller.remove(id)? {
                DeleteOutcome::Deleted => "Task deleted.".to_string(),
                DeleteOutcome::NotFound => format!("There is no task with id {}.", id),
            };
            controller.presenter_mut().notice(&message)?;
        }
        Command::List => controller.refresh()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::task::TaskStatus;
    use crate::view::OutputMode;
    use std::io::Cursor;

    fn run_script(store: &mut TaskStore, script: &str) -> String {
        let view = TerminalView::new(Vec::new(), OutputMode::Pretty);
        let mut controller = TaskListController::new(store, view);
        Shell::new(false).run(&mut controller, Cursor::new(script)).unwrap();
        String::from_utf8(controller.into_presenter().into_inner()).unwrap()
    }

    fn task(line: &str) -> Command {
        match parse_line(line).unwrap() {
            Some(ShellCommand::Task(command)) => command,
            other => panic!("expected a task command for {:?}, got {:?}", line, other),
        }
    }

    fn add(text: &[&str]) -> Command {
        Command::Add {
            text: text.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_commands_and_aliases() {
        assert_eq!(task("add Buy milk"), add(&["Buy", "milk"]));
        assert_eq!(task("  a   Walk dog  "), add(&["Walk", "dog"]));
        assert_eq!(task("toggle 3"), Command::Toggle { id: 3 });
        assert_eq!(task("done 3"), Command::Toggle { id: 3 });
        assert_eq!(task("rm 4"), Command::Remove { id: 4 });
        assert_eq!(task("delete 4"), Command::Remove { id: 4 });
        assert_eq!(task("ls"), Command::List);
        assert_eq!(parse_line("exit").unwrap(), Some(ShellCommand::Quit));
        assert_eq!(parse_line("q").unwrap(), Some(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_blank_and_bare_add() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(task("add"), add(&[]));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("toggle").is_err());
        assert!(parse_line("toggle abc").is_err());
        assert!(parse_line("frobnicate 1").is_err());
    }

    #[test]
    fn test_help_lists_commands_and_aliases() {
        let err = parse_line("help").unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let text = help();
        for word in ["add", "toggle", "remove", "list", "quit", "done", "rm"] {
            assert!(text.contains(word), "help is missing {}: {}", word, text);
        }
    }

    #[test]
    fn test_script_add_toggle_remove() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let out = run_script(&mut store, "add Buy milk\nadd Walk dog\ntoggle 1\nremove 2\n");

        assert!(out.contains("Task added."));
        assert!(out.contains("1. [x] Buy milk"));
        assert!(out.contains("Task deleted."));

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Complete);
    }

    #[test]
    fn test_script_soft_failures_continue() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let out = run_script(&mut store, "add Buy milk\nadd Buy milk\nadd   \nremove 999\ntoggle 999\nbogus\nlist\n");

        assert!(out.contains("This task already exists."));
        assert!(out.contains("Task cannot be empty!"));
        assert!(out.contains("There is no task with id 999."));
        assert!(out.contains("No task with id 999."));
        assert!(out.contains("bogus"));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_help_command_prints_usage_and_continues() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let out = run_script(&mut store, "help\nadd one\n");

        assert!(out.contains("toggle"));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_quit_stops_processing() {
        let mut store = TaskStore::open_in_memory().unwrap();
        run_script(&mut store, "add one\nquit\nadd two\n");

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "one");
    }

    #[test]
    fn test_initial_refresh_shows_existing_tasks() {
        let mut store = TaskStore::open_in_memory().unwrap();
        store.insert("Buy milk", TaskStatus::Incomplete).unwrap();

        let out = run_script(&mut store, "");
        assert_eq!(out, "1. [ ] Buy milk\n");
    }
}
