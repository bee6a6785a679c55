use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

mod actions;
mod export;
mod store;
mod task;
mod ui;

use store::TaskStore;

fn cli() -> Command {
    Command::new("taskpad")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Task list with a JSON store, terminal UI and CSV export")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .default_value("tasks.json")
                .help("Path of the JSON task store"),
        )
        .subcommand(
            Command::new("add")
                .about("Add a new task")
                .arg(Arg::new("title").required(true).help("Task title"))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .value_name("TEXT")
                        .help("Category (defaults to General)"),
                )
                .arg(
                    Arg::new("due")
                        .long("due")
                        .value_name("TEXT")
                        .help("Due date, stored verbatim"),
                )
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_name("TEXT")
                        .help("Priority (defaults to Low)"),
                ),
        )
        .subcommand(Command::new("list").about("List all tasks"))
        .subcommand(
            Command::new("complete")
                .about("Mark a task as completed")
                .arg(
                    Arg::new("index")
                        .required(true)
                        .value_parser(clap::value_parser!(usize))
                        .help("Task number as shown by list"),
                ),
        )
        .subcommand(
            Command::new("delete").about("Delete a task").arg(
                Arg::new("index")
                    .required(true)
                    .value_parser(clap::value_parser!(usize))
                    .help("Task number as shown by list"),
            ),
        )
        .subcommand(Command::new("export").about("Export all tasks to a timestamped CSV file"))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let file = matches
        .get_one::<String>("file")
        .map(String::as_str)
        .unwrap_or("tasks.json");
    let store = TaskStore::new(file);
    store.ensure_exists()?;

    match matches.subcommand() {
        Some(("add", sub)) => run_add(&store, sub),
        Some(("list", _)) => run_list(&store),
        Some(("complete", sub)) => run_indexed(sub, |index| actions::complete_task(&store, index)),
        Some(("delete", sub)) => run_indexed(sub, |index| actions::delete_task(&store, index)),
        Some(("export", _)) => report(actions::export_tasks(&store)),
        _ => run_tui(store),
    }
}

fn run_add(store: &TaskStore, sub: &ArgMatches) -> Result<()> {
    let arg = |name: &str| {
        sub.get_one::<String>(name)
            .map(String::clone)
            .unwrap_or_default()
    };
    let form = actions::TaskForm {
        title: arg("title"),
        category: arg("category"),
        due_date: arg("due"),
        priority: arg("priority"),
    };
    report(actions::add_task(store, &form))
}

fn run_list(store: &TaskStore) -> Result<()> {
    let rows = task::task_rows(&store.load());
    if rows.is_empty() {
        println!("No tasks yet.");
        return Ok(());
    }
    for row in &rows {
        println!(
            "{}. {} {} ({})  Due: {}  {}",
            row.display_index, row.marker, row.title, row.category, row.due, row.priority
        );
    }
    Ok(())
}

// The CLI takes the 1-based number `list` prints; the bounds check itself
// runs against the 0-based position.
fn run_indexed(
    sub: &ArgMatches,
    action: impl FnOnce(usize) -> actions::ActionResult,
) -> Result<()> {
    let display = sub.get_one::<usize>("index").copied().unwrap_or_default();
    match display.checked_sub(1) {
        Some(index) => report(action(index)),
        None => Err(anyhow!("Invalid task index.")),
    }
}

fn report(result: actions::ActionResult) -> Result<()> {
    match result {
        Ok(Some(notice)) => {
            println!("{}", notice.message);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(notice) => Err(anyhow!("{}", notice.message)),
    }
}

fn run_tui(store: TaskStore) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = ui::App::new(store);
    let result = ui::run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{err:?}");
    }
    Ok(())
}
