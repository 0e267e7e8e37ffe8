//! Demo 01: Basic to-do list usage
//!
//! Adds, toggles and removes tasks through the controller, printing the list
//! after every action the way the interactive shell does.
//!
//! Run with: cargo run --example 01_basic_todo

use eyre::Result;
use std::io;
use todolist::{OutputMode, TaskListController, TaskStore, TerminalView};

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("to-do_list.db");

    println!("todolist Basic Demo");
    println!("===================\n");
    println!("Database: {}\n", db_path.display());

    let mut store = TaskStore::open(&db_path)?;

    {
        let view = TerminalView::new(io::stdout(), OutputMode::Pretty);
        let mut controller = TaskListController::new(&mut store, view);

        println!("1. ADD - two tasks");
        controller.add("Buy milk")?;
        controller.add("Walk the dog")?;
        println!();

        println!("2. ADD - the same task again (skipped)");
        let outcome = controller.add("Buy milk")?;
        println!("   Outcome: {:?}\n", outcome);

        println!("3. ADD - blank input (rejected, list not redrawn)");
        let outcome = controller.add("   ")?;
        println!("   Outcome: {:?}\n", outcome);

        println!("4. TOGGLE - mark task 1 done");
        controller.toggle(1)?;
        println!();

        println!("5. REMOVE - task 2, then a task that does not exist");
        controller.remove(2)?;
        let outcome = controller.remove(999)?;
        println!("   Outcome: {:?}\n", outcome);
    }

    // Reopen to show the state was persisted
    store.close()?;
    let store = TaskStore::open(&db_path)?;
    println!("After reopening: {} task(s)", store.list_all()?.len());
    for task in store.list_all()? {
        println!("   - {} : {} ({})", task.id, task.text, task.status);
    }

    println!("\nDemo complete!");
    Ok(())
}
