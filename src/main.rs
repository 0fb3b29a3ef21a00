//! Dictionary Filter - narrow a dictionary corpus with composable word constraints
//!
//! Main entry point for the command-line application.

use anyhow::Context;
use bytesize::ByteSize;
use clap::Parser;
use std::process;

use dictionary_filter::cli::Args;
use dictionary_filter::config::{FilterSpec, LogLevel};
use dictionary_filter::corpus::Corpus;
use dictionary_filter::error::FilterError;
use dictionary_filter::normalize::capitalize;
use dictionary_filter::output::{write_csv, write_report, write_words, RunReport};
use dictionary_filter::pipeline::multi_filter;
use dictionary_filter::progress::{
    group_thousands, loading_spinner, print_definitions, print_stage_table, print_summary,
    print_title, status, Status,
};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();
    let spec = args.filter_spec();

    // Set up logging
    let level = spec.as_ref().map_or(LogLevel::default(), |s| s.log_level);
    init_logging(level, args.quiet);

    // Run the application
    if let Err(e) = spec.and_then(|spec| run(&args, spec)) {
        if !logged_by_pipeline(&e) {
            status(Status::Fail, &format!("{}", e));

            // Print chain of errors
            for cause in e.chain().skip(1) {
                status(Status::Fail, &format!("  Caused by: {}", cause));
            }
        }

        process::exit(1);
    }
}

/// Filter errors are already logged at the critical level by the pipeline
fn logged_by_pipeline(e: &anyhow::Error) -> bool {
    e.downcast_ref::<FilterError>().is_some()
}

fn init_logging(level: LogLevel, quiet: bool) {
    let mut filter = level.level_filter();
    if quiet {
        filter = filter.min(log::LevelFilter::Warn);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter.as_str()))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args, spec: FilterSpec) -> anyhow::Result<()> {
    // Print title unless quiet mode
    if !args.quiet {
        print_title(&args.input.display().to_string());
    }

    let delimiter = args.delimiter_byte()?;
    let corpus = load_corpus(args, delimiter)?;

    if let Some(ref word) = args.define {
        return define(args, &corpus, word);
    }

    if !args.quiet {
        status(
            Status::Info,
            &format!(
                "{} words, columns {:?}",
                group_thousands(corpus.len()),
                corpus.columns()
            ),
        );
    }

    let result = multi_filter(&corpus, &args.column, &spec)?;

    match args.output {
        Some(ref path) => {
            let written = if args.words_only {
                write_words(path, &result)?
            } else {
                write_csv(path, &result.corpus, delimiter)?
            };

            if !args.quiet {
                let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                status(
                    Status::Done,
                    &format!(
                        "{} words written to {:?} ({})",
                        group_thousands(written as usize),
                        path,
                        ByteSize::b(size)
                    ),
                );
            }
        }
        None => {
            for word in result.words() {
                println!("{}", word);
            }
        }
    }

    if let Some(ref path) = args.report {
        write_report(path, &RunReport::new(&args.column, &result))?;
        if !args.quiet {
            status(Status::Done, &format!("Report written to {:?}", path));
        }
    }

    if args.quiet {
        return Ok(());
    }

    if args.stats {
        print_stage_table(result.stages());
        print_summary(&result.summary);
    } else if result.is_empty() {
        status(Status::Warn, "No words found");
    } else {
        status(
            Status::Done,
            &format!("{} words kept", group_thousands(result.len())),
        );
    }

    Ok(())
}

/// Load, decode and clean the corpus
fn load_corpus(args: &Args, delimiter: u8) -> anyhow::Result<Corpus> {
    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {:?}", args.input);
    }

    let size = std::fs::metadata(&args.input)
        .with_context(|| format!("Cannot read metadata of {:?}", args.input))?
        .len();

    let spinner = (!args.quiet).then(|| {
        loading_spinner(&format!("{} ({})", args.input.display(), ByteSize::b(size)))
    });

    let loaded = Corpus::load_csv(&args.input, delimiter).and_then(|c| c.prepare(&args.column));

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    loaded.with_context(|| format!("Failed to load corpus {:?}", args.input))
}

/// Print the definitions of one word
fn define(args: &Args, corpus: &Corpus, word: &str) -> anyhow::Result<()> {
    let word = capitalize(word.trim());

    match corpus.define(&args.column, &args.definition_column, &word)? {
        Some(definitions) if !definitions.is_empty() => print_definitions(&word, &definitions),
        Some(_) => status(Status::Warn, &format!("'{}' has no definition", word)),
        None => status(Status::Warn, &format!("'{}' is not in the corpus", word)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_errors_printed_once() {
        let corpus = Corpus::from_words("Mot", ["Chat"]);
        let spec = FilterSpec::new().with_log_level(LogLevel::None);

        let err: anyhow::Error = multi_filter(&corpus, "Word", &spec).unwrap_err().into();
        assert!(logged_by_pipeline(&err));

        let err = anyhow::anyhow!("Input path does not exist: \"dico.csv\"");
        assert!(!logged_by_pipeline(&err));
    }
}
