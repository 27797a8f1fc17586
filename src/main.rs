use clap::{Arg, Command};
use log::LevelFilter;
use std::process;

use magic_shelf::{Book, MagicShelf, ShelfEngine};

fn main() {
    let matches = Command::new("magic-shelf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Evaluate a magic-shelf definition against a book catalog")
        .arg(
            Arg::new("shelf")
                .short('s')
                .long("shelf")
                .value_name("FILE")
                .help("Shelf definition file (JSON)"),
        )
        .arg(
            Arg::new("books")
                .short('b')
                .long("books")
                .value_name("FILE")
                .help("Book catalog file (JSON array)"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Print only the number of matching books")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-shelf")
                .long("check-shelf")
                .help("Validate that the shelf definition decodes and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("generate-shelf")
                .long("generate-shelf")
                .value_name("FILE")
                .help("Write a sample shelf definition file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging of rule evaluation")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-shelf") {
        generate_sample_shelf(generate_path);
        return;
    }

    let shelf_path = match matches.get_one::<String>("shelf") {
        Some(path) => path,
        None => {
            eprintln!("--shelf is required (or use --generate-shelf)");
            process::exit(2);
        }
    };

    let shelf = match MagicShelf::from_file(shelf_path) {
        Ok(shelf) => shelf,
        Err(e) => {
            eprintln!("Error loading shelf definition: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("check-shelf") {
        println!("Shelf '{}' is valid", shelf.name);
        return;
    }

    let books_path = match matches.get_one::<String>("books") {
        Some(path) => path,
        None => {
            eprintln!("--books is required");
            process::exit(2);
        }
    };

    let books = match load_books(books_path) {
        Ok(books) => books,
        Err(e) => {
            eprintln!("Error loading book catalog: {e:#}");
            process::exit(1);
        }
    };

    let engine = ShelfEngine::new(shelf);
    let matching = engine.filter(&books);

    if matches.get_flag("count") {
        println!("{}", matching.len());
        return;
    }

    for book in &matching {
        println!("{}\t{}", book.id, book.title().unwrap_or(&book.file_name));
    }
    log::info!(
        "shelf '{}': {} of {} books",
        engine.shelf().name,
        matching.len(),
        books.len()
    );
}

fn load_books(path: &str) -> anyhow::Result<Vec<Book>> {
    let content = std::fs::read_to_string(path)?;
    let books: Vec<Book> = serde_json::from_str(&content)?;
    Ok(books)
}

fn generate_sample_shelf(path: &str) {
    let sample = serde_json::json!({
        "name": "Long unread books",
        "icon": "bookshelf",
        "public": false,
        "filter": {
            "join": "and",
            "rules": [
                {"field": "readStatus", "operator": "equals", "value": "UNREAD"},
                {"field": "pageCount", "operator": "greater_than", "value": 300}
            ]
        }
    });
    match std::fs::write(path, serde_json::to_string_pretty(&sample).unwrap()) {
        Ok(()) => println!("Sample shelf definition written to: {path}"),
        Err(e) => {
            eprintln!("Error writing sample shelf: {e}");
            process::exit(1);
        }
    }
}
