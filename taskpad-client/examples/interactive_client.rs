use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::sync::Arc;
use taskpad_client::{
    ApiClient, ClientEvent, EventDispatcher, SessionManager, SessionState, TaskStore, TokenStore,
};

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "Interactive task list client", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(short, long, default_value = "http://localhost:8080/api")]
    server: String,

    /// Token database file
    #[arg(short, long, default_value = "taskpad.db")]
    database: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (only show warnings and errors)
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let cli = Cli::parse();
    let db_url = format!("sqlite:{}?mode=rwc", cli.database);

    println!("{}", "📝 Taskpad".bold().cyan());
    println!("{}", "==========".cyan());
    println!("🌐 Server: {}", cli.server.blue());

    let events = Arc::new(EventDispatcher::new());
    events.subscribe(|event| {
        if let ClientEvent::SessionChanged(SessionState::Anonymous) = event {
            println!("{}", "🔒 Session ended, please log in again".yellow());
        }
    });

    let api = ApiClient::new(&cli.server)?;
    let store = TokenStore::new(&db_url).await?;
    let session = Arc::new(SessionManager::new(api.clone(), store, events.clone()).await?);
    let tasks = TaskStore::new(api, session.clone(), events.clone());

    if session.state().await == SessionState::Authenticated {
        println!("{}", "✅ Restored previous session".green());
    }

    loop {
        match session.state().await {
            SessionState::Anonymous => {
                let choice = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("What would you like to do?")
                    .items(&["Log in", "Sign up", "Quit"])
                    .default(0)
                    .interact()?;

                match choice {
                    0 => {
                        let email: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Email")
                            .interact_text()?;
                        let password: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Password")
                            .interact_text()?;
                        match session.login(&email, &password).await {
                            Ok(()) => println!("{}", "✅ Logged in!".green()),
                            Err(e) => println!("{} {}", "❌".red(), e),
                        }
                    }
                    1 => {
                        let email: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Email")
                            .interact_text()?;
                        let password: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Password")
                            .interact_text()?;
                        let first_name: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("First name")
                            .interact_text()?;
                        let last_name: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Last name")
                            .interact_text()?;
                        match session
                            .signup(&email, &password, &first_name, &last_name)
                            .await
                        {
                            Ok(()) => println!("{}", "✅ Account created!".green()),
                            Err(e) => println!("{} {}", "❌".red(), e),
                        }
                    }
                    _ => break,
                }
            }
            SessionState::Authenticated => {
                let choice = Select::with_theme(&ColorfulTheme::default())
                    .with_prompt("What would you like to do?")
                    .items(&[
                        "List tasks",
                        "Add task",
                        "Toggle completion",
                        "Delete task",
                        "Log out",
                        "Quit",
                    ])
                    .default(0)
                    .interact()?;

                match choice {
                    0 => match tasks.refresh().await {
                        Ok(list) => print_tasks(&list),
                        Err(e) => println!("{} {}", "❌".red(), e),
                    },
                    1 => {
                        let title: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Title")
                            .interact_text()?;
                        let description: String = Input::with_theme(&ColorfulTheme::default())
                            .with_prompt("Description")
                            .interact_text()?;
                        match tasks.create(&title, &description).await {
                            Ok(task) => println!("✅ Created task {}", task.id.to_string().green()),
                            Err(e) => println!("{} {}", "❌".red(), e),
                        }
                    }
                    2 => {
                        if let Some(id) = pick_task(&tasks).await? {
                            match tasks.toggle_completion(id).await {
                                Ok(task) => {
                                    let state = if task.completed { "done" } else { "open" };
                                    println!("✅ Task {} is now {}", id, state.green());
                                }
                                Err(e) => println!("{} {}", "❌".red(), e),
                            }
                        }
                    }
                    3 => {
                        if let Some(id) = pick_task(&tasks).await? {
                            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                                .with_prompt(format!("Delete task {}?", id))
                                .interact()?;
                            if confirmed {
                                match tasks.remove(id).await {
                                    Ok(()) => println!("{}", "🗑️  Deleted".green()),
                                    Err(e) => println!("{} {}", "❌".red(), e),
                                }
                            }
                        }
                    }
                    4 => {
                        session.logout().await?;
                        println!("{}", "👋 Logged out".green());
                    }
                    _ => break,
                }
            }
        }
    }

    println!("{}", "👋 Goodbye!".cyan());
    Ok(())
}

fn print_tasks(list: &[taskpad_core::models::Task]) {
    if list.is_empty() {
        println!("{}", "(no tasks)".dimmed());
        return;
    }
    for task in list {
        let marker = if task.completed { "✔" } else { " " };
        println!(
            "[{}] {} {} — {}",
            marker.green(),
            task.id.to_string().yellow(),
            task.title.bold(),
            task.description.dimmed()
        );
    }
}

async fn pick_task(
    tasks: &TaskStore,
) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    let cached = tasks.tasks().await;
    if cached.is_empty() {
        println!("{}", "(no tasks cached — list tasks first)".dimmed());
        return Ok(None);
    }

    let labels: Vec<String> = cached
        .iter()
        .map(|t| format!("{} — {}", t.id, t.title))
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which task?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Some(cached[choice].id))
}
