// Biblio - Mobile Library Client
// Copyright (C) 2025 Biblio contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Desktop harness over the client core
//!
//! Drives the same `BiblioApp` surface the mobile frontends use, against a
//! local database file. Useful for poking at a backend without a device.

use anyhow::Context;
use biblio_core::api::books::{Book, BookCreateRequest, BookUpdateRequest};
use biblio_core::api::client::ClientConfig;
use biblio_core::app::BiblioApp;
use biblio_core::state::SessionState;
use biblio_core::storage::Database;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "biblio-cli")]
#[command(about = "Biblio CLI - Desktop testing tool", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "BIBLIO_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Database file (defaults to the per-user data directory)
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear the persisted token
    Logout,
    /// Show the current session state
    Status,
    /// List available books
    List,
    /// List books borrowed by the logged-in user
    Borrowed,
    /// Show one book
    Show { id: i64 },
    /// Add a book to the catalog
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        author: String,
        #[arg(short, long)]
        description: String,
    },
    /// Edit an existing book
    Edit {
        id: i64,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        author: String,
        #[arg(short, long)]
        description: String,
    },
    /// Remove a book from the catalog
    Remove { id: i64 },
    /// Borrow a book
    Borrow { id: i64 },
    /// Return a borrowed book
    Return { id: i64 },
}

fn print_book(book: &Book) {
    let availability = match book.available {
        Some(true) => "available",
        Some(false) => "borrowed",
        None => "unknown",
    };
    println!("#{} {} - {} [{}]", book.id, book.title, book.author, availability);
    if !book.description.is_empty() {
        println!("    {}", book.description);
    }
    if let Some(by) = &book.borrowed_by {
        println!("    borrowed by {by}");
    }
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("(no books)");
    }
    for book in books {
        print_book(book);
    }
}

/// Surface the store's recorded error when an operation yields nothing
fn report<T>(result: Option<T>, error: Option<String>) -> anyhow::Result<T> {
    result.ok_or_else(|| {
        anyhow::anyhow!(error.unwrap_or_else(|| "operation failed".to_string()))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biblio_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let db_path = cli.database.unwrap_or_else(Database::default_path);
    let database = Database::new(&db_path)
        .await
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    let config = ClientConfig::builder().base_url(&cli.base_url).build();
    let app = BiblioApp::connect(config, &database).await?;

    match cli.command {
        Commands::Login { username, password } => {
            app.session().login(&username, &password).await?;
            println!("Logged in as {username}");
        }
        Commands::Register { username, password } => {
            app.session().register(&username, &password).await?;
            println!("Account created for {username}, log in to start a session");
        }
        Commands::Logout => {
            app.session().logout().await;
            println!("Logged out");
        }
        Commands::Status => match app.state() {
            SessionState::Active => println!("Session: active"),
            SessionState::Inactive => println!("Session: inactive"),
            SessionState::Loading => println!("Session: loading"),
        },
        Commands::List => {
            app.books().fetch_books().await;
            if let Some(error) = app.books().error().await {
                anyhow::bail!(error);
            }
            print_books(&app.books().books().await);
        }
        Commands::Borrowed => {
            app.books().fetch_borrowed_books().await;
            if let Some(error) = app.books().error().await {
                anyhow::bail!(error);
            }
            print_books(&app.books().borrowed_books().await);
        }
        Commands::Show { id } => {
            let result = app.books().get_book(id).await;
            let book = report(result, app.books().error().await)?;
            print_book(&book);
        }
        Commands::Add {
            title,
            author,
            description,
        } => {
            let request = BookCreateRequest {
                title,
                author,
                description,
            };
            let result = app.books().create_book(&request).await;
            let book = report(result, app.books().error().await)?;
            println!("Created:");
            print_book(&book);
        }
        Commands::Edit {
            id,
            title,
            author,
            description,
        } => {
            let request = BookUpdateRequest {
                id,
                title,
                author,
                description,
            };
            let result = app.books().update_book(&request).await;
            let book = report(result, app.books().error().await)?;
            println!("Updated:");
            print_book(&book);
        }
        Commands::Remove { id } => {
            if app.books().delete_book(id).await {
                println!("Deleted book #{id}");
            } else {
                let error = app.books().error().await;
                anyhow::bail!(error.unwrap_or_else(|| "operation failed".to_string()));
            }
        }
        Commands::Borrow { id } => {
            let result = app.books().borrow_book(id).await;
            let book = report(result, app.books().error().await)?;
            println!("Borrowed:");
            print_book(&book);
        }
        Commands::Return { id } => {
            let result = app.books().return_book(id).await;
            let book = report(result, app.books().error().await)?;
            println!("Returned:");
            print_book(&book);
        }
    }

    app.shutdown();
    Ok(())
}
