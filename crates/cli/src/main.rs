use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_stream::{GroupedRatingStream, MovieRatingGroup, MovieTitle, parse_movie_titles};
use emitters::{
    DocumentEmitter, FlatCsvEmitter, UpdatePayloadEmitter, ViewerIdEmitter, emit_groups,
    emit_movie_bulk, emit_movie_csv, emit_movie_sql, emit_movie_updates, new_movie_bulk_json,
    new_movie_document, new_movie_insert_sql,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Netflix Prize data tools: loaders and queries over the raw dataset files
#[derive(Parser)]
#[command(name = "netflix-prize")]
#[command(about = "Convert and query the Netflix Prize dataset files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The rating source files, in order. Defaults to the four files the
/// dataset ships with, assuming the program runs where they live.
#[derive(Args)]
struct SourceArgs {
    #[arg(
        long = "source",
        num_args = 1..,
        default_values = [
            "combined_data_1.txt",
            "combined_data_2.txt",
            "combined_data_3.txt",
            "combined_data_4.txt",
        ]
    )]
    sources: Vec<PathBuf>,
}

#[derive(Args)]
struct TitlesArg {
    /// Path to the movie_titles.csv metadata file
    #[arg(long, default_value = "movie_titles.csv")]
    titles: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten the rating files into one CSV with the movie id prepended
    PreprocessRatings {
        #[command(flatten)]
        source: SourceArgs,

        /// Output CSV file
        #[arg(long, default_value = "ratings.csv")]
        destination: PathBuf,
    },

    /// Extract unique viewer ids for the graph bulk importer
    PreprocessViewers {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file, one viewer id per line
        #[arg(long, default_value = "viewers.csv")]
        destination: PathBuf,
    },

    /// Re-quote movie_titles.csv for the graph bulk importer (stdout)
    PreprocessMovies {
        #[command(flatten)]
        titles: TitlesArg,
    },

    /// Emit one JSON document per movie for mongoimport (stdout)
    EmitDocuments {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Emit _bulk update payloads that attach ratings to movies (stdout)
    EmitUpdates {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Emit SQL INSERT statements for the movie table (stdout)
    EmitMovieSql {
        #[command(flatten)]
        titles: TitlesArg,
    },

    /// Emit _bulk index pairs for the movie metadata (stdout)
    EmitMovieBulk {
        #[command(flatten)]
        titles: TitlesArg,
    },

    /// Emit mongo updateOne commands that set movie titles (stdout)
    EmitMovieUpdates {
        #[command(flatten)]
        titles: TitlesArg,
    },

    /// Emit the insert payload for one new movie (stdout)
    AddMovie {
        /// Title of the movie to add
        title: String,

        /// Release year of the movie
        year: u16,

        /// Which backend's insert payload to emit
        #[arg(long, value_enum, default_value = "sql")]
        format: InsertFormat,
    },

    /// Compute a movie's average rating straight from the source files
    AverageRating {
        /// Movie ID to look up
        movie_id: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print every rating of one movie
    RatingsOfMovie {
        /// Movie ID to look up
        movie_id: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print one viewer's ratings across all movies
    RatingsByViewer {
        /// Viewer ID to look up
        viewer_id: u32,

        #[command(flatten)]
        source: SourceArgs,

        /// Optional movie_titles.csv for showing titles instead of ids
        #[arg(long)]
        titles: Option<PathBuf>,

        /// Maximum number of ratings to print
        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// Search movies by title (case-insensitive substring)
    SearchByTitle {
        /// Title text to search for
        query: String,

        #[command(flatten)]
        titles: TitlesArg,

        /// Maximum number of matches to print
        #[arg(long, default_value = "100")]
        limit: usize,
    },
}

/// Insert payload flavors for `add-movie`, one per backend family.
///
/// In every flavor the id is left to the backend: the relational sequence
/// assigns the next integer, the document stores generate their own
/// (non-integer) ids.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum InsertFormat {
    /// SQL INSERT for the relational movie table
    Sql,
    /// mongo-shell insertOne command
    Mongo,
    /// _bulk index pair for the search index
    Bulk,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::PreprocessRatings {
            source,
            destination,
        } => handle_preprocess_ratings(source.sources, destination)?,
        Commands::PreprocessViewers {
            source,
            destination,
        } => handle_preprocess_viewers(source.sources, destination)?,
        Commands::PreprocessMovies { titles } => {
            let movies = load_titles(&titles.titles)?;
            emit_movie_csv(&movies, &mut stdout_writer())?;
        }
        Commands::EmitDocuments { source } => {
            emit_groups(
                GroupedRatingStream::open(source.sources),
                &mut DocumentEmitter,
                &mut stdout_writer(),
            )?;
        }
        Commands::EmitUpdates { source } => {
            emit_groups(
                GroupedRatingStream::open(source.sources),
                &mut UpdatePayloadEmitter,
                &mut stdout_writer(),
            )?;
        }
        Commands::EmitMovieSql { titles } => {
            let movies = load_titles(&titles.titles)?;
            emit_movie_sql(&movies, &mut stdout_writer())?;
        }
        Commands::EmitMovieBulk { titles } => {
            let movies = load_titles(&titles.titles)?;
            emit_movie_bulk(&movies, &mut stdout_writer())?;
        }
        Commands::EmitMovieUpdates { titles } => {
            let movies = load_titles(&titles.titles)?;
            emit_movie_updates(&movies, &mut stdout_writer())?;
        }
        Commands::AddMovie {
            title,
            year,
            format,
        } => handle_add_movie(&title, year, format),
        Commands::AverageRating { movie_id, source } => {
            handle_average_rating(&movie_id, source.sources)?
        }
        Commands::RatingsOfMovie { movie_id, source } => {
            handle_ratings_of_movie(&movie_id, source.sources)?
        }
        Commands::RatingsByViewer {
            viewer_id,
            source,
            titles,
            limit,
        } => handle_ratings_by_viewer(viewer_id, source.sources, titles, limit)?,
        Commands::SearchByTitle {
            query,
            titles,
            limit,
        } => handle_search_by_title(&query, &titles.titles, limit)?,
    }

    Ok(())
}

fn stdout_writer() -> BufWriter<io::Stdout> {
    BufWriter::new(io::stdout())
}

fn load_titles(path: &PathBuf) -> Result<Vec<MovieTitle>> {
    parse_movie_titles(path)
        .with_context(|| format!("Failed to load movie titles from {}", path.display()))
}

/// Handle the 'preprocess-ratings' command
fn handle_preprocess_ratings(sources: Vec<PathBuf>, destination: PathBuf) -> Result<()> {
    let file = File::create(&destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;
    let mut out = BufWriter::new(file);

    let count = emit_groups(
        GroupedRatingStream::open(sources),
        &mut FlatCsvEmitter,
        &mut out,
    )?;

    println!(
        "{} Wrote {} movies' ratings to {}",
        "✓".green(),
        count,
        destination.display()
    );
    Ok(())
}

/// Handle the 'preprocess-viewers' command
fn handle_preprocess_viewers(sources: Vec<PathBuf>, destination: PathBuf) -> Result<()> {
    let file = File::create(&destination)
        .with_context(|| format!("Failed to create {}", destination.display()))?;
    let mut out = BufWriter::new(file);

    emit_groups(
        GroupedRatingStream::open(sources),
        &mut ViewerIdEmitter::new(),
        &mut out,
    )?;

    println!(
        "{} Wrote unique viewer ids to {}",
        "✓".green(),
        destination.display()
    );
    Ok(())
}

/// Build the insert payload for one new movie in the requested flavor.
fn new_movie_payload(format: InsertFormat, title: &str, year: u16) -> String {
    match format {
        InsertFormat::Sql => new_movie_insert_sql(title, year),
        InsertFormat::Mongo => new_movie_document(title, year),
        InsertFormat::Bulk => new_movie_bulk_json(title, year),
    }
}

/// Handle the 'add-movie' command
///
/// The payload goes to stdout so it pipes into the backend's own client;
/// the confirmation goes to stderr to keep the pipe clean. There is no ID
/// in the confirmation because the backend assigns one on load.
fn handle_add_movie(title: &str, year: u16, format: InsertFormat) {
    println!("{}", new_movie_payload(format, title, year));
    eprintln!("Movie “{}” ({}) added.", title, year);
}

/// What a scan found for one queried movie.
#[derive(Debug, PartialEq)]
enum MovieLookup {
    NotFound,
    /// The movie exists but its ratings block is empty.
    NoRatings,
    Found(MovieRatingGroup),
}

/// Scan until the queried movie's group closes, then stop.
///
/// Ratings are grouped by movie in the source files, so once the group has
/// been yielded there is nothing further to read; the remaining files are
/// never opened.
fn find_movie(movie_id: &str, sources: Vec<PathBuf>) -> Result<MovieLookup> {
    for group in GroupedRatingStream::open(sources) {
        let group = group?;
        if group.movie_id == movie_id {
            return Ok(if group.ratings.is_empty() {
                MovieLookup::NoRatings
            } else {
                MovieLookup::Found(group)
            });
        }
    }
    Ok(MovieLookup::NotFound)
}

/// Handle the 'average-rating' command
fn handle_average_rating(movie_id: &str, sources: Vec<PathBuf>) -> Result<()> {
    match find_movie(movie_id, sources)? {
        MovieLookup::NotFound => println!("There is no movie with ID {}.", movie_id),
        MovieLookup::NoRatings => {
            println!("The movie with ID {} has no ratings yet.", movie_id)
        }
        MovieLookup::Found(group) => {
            let count = group.ratings.len();
            let total: i64 = group.ratings.iter().map(|r| i64::from(r.rating)).sum();
            let average = total as f64 / count as f64;
            println!(
                "Movie {} has an average rating of {} over {} known ratings.",
                movie_id, average, count
            );
        }
    }
    Ok(())
}

/// Handle the 'ratings-of-movie' command
fn handle_ratings_of_movie(movie_id: &str, sources: Vec<PathBuf>) -> Result<()> {
    match find_movie(movie_id, sources)? {
        MovieLookup::NotFound => println!("There is no movie with ID {}.", movie_id),
        MovieLookup::NoRatings => {
            println!("The movie with ID {} has no ratings yet.", movie_id)
        }
        MovieLookup::Found(group) => {
            println!(
                "{}",
                format!("Ratings for movie {}:", movie_id).bold().blue()
            );
            for rating in &group.ratings {
                println!(
                    "{}: viewer {} gave a {}.",
                    rating.date_rated, rating.viewer_id, rating.rating
                );
            }
        }
    }
    Ok(())
}

/// Handle the 'ratings-by-viewer' command
///
/// There is no viewer index in the raw files, so this is a full scan: every
/// group is checked for the viewer. Output is ordered by date rated, then
/// movie title, the same ordering the database-backed versions use.
fn handle_ratings_by_viewer(
    viewer_id: u32,
    sources: Vec<PathBuf>,
    titles: Option<PathBuf>,
    limit: usize,
) -> Result<()> {
    let title_by_id: Option<HashMap<String, String>> = match titles {
        Some(path) => Some(
            load_titles(&path)?
                .into_iter()
                .map(|movie| (movie.id, movie.title))
                .collect(),
        ),
        None => None,
    };

    let mut found: Vec<(String, String, i32)> = Vec::new();
    for group in GroupedRatingStream::open(sources) {
        let group = group?;
        for rating in &group.ratings {
            if rating.viewer_id == viewer_id {
                let title = title_by_id
                    .as_ref()
                    .and_then(|map| map.get(&group.movie_id).cloned())
                    .unwrap_or_else(|| format!("movie {}", group.movie_id));
                found.push((rating.date_rated.clone(), title, rating.rating));
            }
        }
    }

    if found.is_empty() {
        println!(
            "The viewer {} does not have any ratings in the source files.",
            viewer_id
        );
        return Ok(());
    }

    found.sort();
    for (date_rated, title, rating) in found.into_iter().take(limit) {
        println!("{}: “{}” got a {}.", date_rated, title, rating);
    }
    Ok(())
}

/// Handle the 'search-by-title' command
fn handle_search_by_title(query: &str, titles: &PathBuf, limit: usize) -> Result<()> {
    let mut movies = load_titles(titles)?;
    let query_lower = query.to_lowercase();

    movies.retain(|movie| movie.title.to_lowercase().contains(&query_lower));
    if movies.is_empty() {
        println!("No movies match “{}.”", query);
        return Ok(());
    }

    movies.sort_by(|a, b| a.title.cmp(&b.title));
    for movie in movies.iter().take(limit) {
        let year = movie
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{} “{}” ({})", movie.id, movie.title, year);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_find_movie_distinguishes_missing_from_unrated() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "data.txt", "7:\n1,5,2001-01-01\n9:\n");

        assert!(matches!(
            find_movie("7", vec![path.clone()]).unwrap(),
            MovieLookup::Found(_)
        ));
        assert_eq!(
            find_movie("9", vec![path.clone()]).unwrap(),
            MovieLookup::NoRatings
        );
        assert_eq!(find_movie("8", vec![path]).unwrap(), MovieLookup::NotFound);
    }

    #[test]
    fn test_find_movie_stops_before_later_files() {
        // The second file does not exist; an early match must mean it is
        // never opened.
        let dir = TempDir::new().unwrap();
        let first = write_source(&dir, "data.txt", "7:\n1,5,2001-01-01\n9:\n");
        let missing = dir.path().join("never-read.txt");

        let lookup = find_movie("7", vec![first, missing]).unwrap();
        match lookup {
            MovieLookup::Found(group) => assert_eq!(group.ratings.len(), 1),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }

    #[test]
    fn test_average_over_found_group() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "data.txt", "7:\n1,5,2001-01-01\n2,4,2001-02-02\n");

        let lookup = find_movie("7", vec![path]).unwrap();
        let MovieLookup::Found(group) = lookup else {
            panic!("expected a found group");
        };
        let total: i64 = group.ratings.iter().map(|r| i64::from(r.rating)).sum();
        let average = total as f64 / group.ratings.len() as f64;
        assert_eq!(average, 4.5);
    }

    #[test]
    fn test_add_movie_payload_per_backend() {
        assert_eq!(
            new_movie_payload(InsertFormat::Sql, "Sharknado", 2013),
            "INSERT INTO movie (year, title) VALUES(2013, 'Sharknado');"
        );

        let mongo = new_movie_payload(InsertFormat::Mongo, "Sharknado", 2013);
        assert!(mongo.starts_with("db.movies.insertOne("));

        let bulk = new_movie_payload(InsertFormat::Bulk, "Sharknado", 2013);
        assert_eq!(bulk.lines().count(), 2);
        let action: serde_json::Value =
            serde_json::from_str(bulk.lines().next().unwrap()).unwrap();
        assert!(action["index"].get("_id").is_none());
    }

    #[test]
    fn test_scan_error_propagates_from_find_movie() {
        let dir = TempDir::new().unwrap();
        let path = write_source(&dir, "bad.txt", "7:\n1,5\n");

        assert!(find_movie("9", vec![path]).is_err());
    }
}
