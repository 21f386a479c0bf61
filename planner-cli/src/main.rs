use anyhow::Context;
use chrono::{Duration, Local};
use clap::{Parser, Subcommand};
use planner_core::domain::task::Task;
use planner_core::infrastructure::config::AppConfig;
use planner_core::infrastructure::logging::init_logging;
use planner_core::infrastructure::notifications::Trigger;
use planner_core::presentation::dto::{
    LoginRequest, RegisterRequest, TaskEditForm, TaskForm, format_date, format_time,
};
use planner_core::{DomainError, Planner, TaskType};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[clap(name = "planner", about = "Study planner with local due-date reminders")]
struct Cli {
    /// Directory holding the planner data (overrides PLANNER_DATA_DIR)
    #[clap(short, long)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        confirm_password: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    Whoami,
    Add {
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "")]
        description: String,
        #[clap(long = "type", default_value = "Assignment")]
        task_type: TaskType,
        /// MM/DD/YYYY or YYYY-MM-DD, defaults to today
        #[clap(long)]
        date: Option<String>,
        /// HH:MM, 24h
        #[clap(long, default_value = "09:00")]
        time: String,
    },
    Edit {
        id: Uuid,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long = "type")]
        task_type: Option<TaskType>,
        #[clap(long)]
        date: Option<String>,
        #[clap(long)]
        time: Option<String>,
    },
    Toggle {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
    /// Every stored task, completed ones included
    List,
    /// Open tasks due today and later
    Agenda,
    /// Reminders currently scheduled
    Reminders {
        /// Cancel every scheduled reminder
        #[clap(long)]
        clear: bool,
    },
    /// Writes sample tasks into an empty store
    Seed,
}

impl Command {
    fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Register { .. } | Command::Login { .. } | Command::Logout | Command::Whoami
        )
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        match err.downcast_ref::<DomainError>() {
            Some(domain) if domain.is_user_facing() => eprintln!("Error: {domain}"),
            _ => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    init_logging(config.log_json);

    let planner = Planner::open(&config).await?;

    if args.command.needs_session() && planner.current_user().await.is_none() {
        anyhow::bail!("no account found, run `planner register` first");
    }

    let today = Local::now().date_naive();
    match args.command {
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let user = planner
                .register(RegisterRequest {
                    name,
                    email,
                    password,
                    confirm_password,
                })
                .await?;
            println!("Account created for {}!", user.email);
        }
        Command::Login { email, password } => {
            let user = planner.login(LoginRequest { email, password }).await?;
            println!("Welcome back, {}!", user.name);
        }
        Command::Logout => {
            planner.logout().await?;
            println!("Logged out.");
        }
        Command::Whoami => match planner.current_user().await {
            Some(user) => println!("{} <{}>", user.name, user.email),
            None => println!("No account stored."),
        },
        Command::Add {
            title,
            description,
            task_type,
            date,
            time,
        } => {
            let due_date = date.unwrap_or_else(|| today.format("%m/%d/%Y").to_string());
            let task = planner
                .create_task(TaskForm {
                    title,
                    description,
                    task_type,
                    due_date,
                    due_time: time,
                })
                .await?;
            println!("Task added! ID: {}", task.id);
            print_reminder_state(&task);
        }
        Command::Edit {
            id,
            title,
            description,
            task_type,
            date,
            time,
        } => {
            let task = planner
                .edit_task(
                    id,
                    TaskEditForm {
                        title,
                        description,
                        task_type,
                        due_date: date,
                        due_time: time,
                    },
                )
                .await?;
            println!("Task updated: {}", task);
            print_reminder_state(&task);
        }
        Command::Toggle { id } => {
            let task = planner.complete_toggle(id).await?;
            let state = if task.completed { "completed" } else { "reopened" };
            println!("Task {}: {}", state, task.title);
        }
        Command::Delete { id } => {
            planner.delete_task(id).await?;
            println!("Task deleted!");
        }
        Command::List => {
            let mut tasks = planner.list_tasks().await;
            tasks.sort_by_key(Task::due_at);
            let now = Local::now().naive_local();
            println!("Tasks ({})", tasks.len());
            for task in tasks {
                if task.is_overdue(now) {
                    println!("{} (overdue)", task);
                } else {
                    println!("{}", task);
                }
            }
        }
        Command::Agenda => {
            let agenda = planner.agenda(today).await;
            println!("Today ({})", agenda.today.len());
            for task in &agenda.today {
                print_agenda_line(task);
            }
            println!("Upcoming ({})", agenda.upcoming.len());
            for task in &agenda.upcoming {
                print_agenda_line(task);
            }
        }
        Command::Reminders { clear: true } => {
            if planner.clear_reminders().await {
                println!("All reminders cancelled.");
            } else {
                anyhow::bail!("failed to cancel reminders");
            }
        }
        Command::Reminders { clear: false } => {
            let reminders = planner.reminders().await;
            println!("Reminders ({})", reminders.len());
            for reminder in reminders {
                let when = match reminder.trigger {
                    Trigger::Daily { hour, minute } => format!("daily at {hour:02}:{minute:02}"),
                    Trigger::Once { at } => format!("once at {}", at.format("%Y-%m-%d %H:%M")),
                };
                println!("- [{}] {} ({})", reminder.id, reminder.payload.title, when);
            }
        }
        Command::Seed => {
            if planner.seed_sample_data(today).await? {
                println!("Sample tasks added.");
            } else {
                println!("Store already has tasks, nothing to do.");
            }
        }
    }

    Ok(())
}

fn print_agenda_line(task: &Task) {
    let tomorrow = Local::now().date_naive() + Duration::days(1);
    let day = if task.due_date == tomorrow {
        "Tomorrow".to_string()
    } else {
        format_date(task.due_date)
    };
    println!(
        "- {} | {} {} | {} [{}]",
        task.title,
        day,
        format_time(task.due_time),
        task.task_type,
        task.id
    );
}

fn print_reminder_state(task: &Task) {
    match &task.notification_id {
        Some(id) => println!("Reminder scheduled ({id})."),
        None => println!("No reminder scheduled."),
    }
}
