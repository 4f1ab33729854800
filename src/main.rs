// main.rs

use chrono::Utc;
use freelance_board::api::RestBackend;
use freelance_board::board::Board;
use freelance_board::config::Config;
use freelance_board::dashboard::load_dashboard;
use freelance_board::logging::init_logging;
use std::sync::Arc;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let _guard = init_logging(&config)?;

    let backend = Arc::new(RestBackend::from_config(&config));
    let mut board = Board::new(backend.clone());

    if let Err(err) = board.load().await {
        eprintln!("{}", err.notice());
        return Err(err.into());
    }

    for column in board.columns() {
        println!("{} ({})", column.status.name, column.tasks.len());
        for task in column.tasks {
            let project = task.project_name().unwrap_or("-");
            match task.deadline {
                Some(deadline) => println!(
                    "  [{}] {} · {} · {}",
                    task.priority,
                    task.title,
                    project,
                    deadline.format("%Y-%m-%d")
                ),
                None => println!("  [{}] {} · {}", task.priority, task.title, project),
            }
        }
    }

    let orphaned = board.orphaned();
    if !orphaned.is_empty() {
        println!("Without column ({})", orphaned.len());
        for task in orphaned {
            println!("  {} (status '{}')", task.title, task.status);
        }
    }

    match load_dashboard(backend.as_ref(), Utc::now()).await {
        Ok(stats) => println!(
            "Projects: {} active, {} completed · Tasks this week: {}/{} done · Productivity: {}%",
            stats.active_projects,
            stats.completed_projects,
            stats.completed_tasks,
            stats.total_tasks,
            stats.productivity_score
        ),
        Err(err) => error!(error = %err, "{}", err.notice()),
    }

    Ok(())
}
