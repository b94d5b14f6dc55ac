mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use logger::CliLogger;
use pdf_assemble::{ExportOptions, PageId, SessionView, WatermarkOptions};
use pdf_async_runtime::{SessionCommand, SessionUpdate, spawn_worker};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "pdft", about = "PDF tools CLI", version)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDFs and images into one PDF
    Assemble {
        /// Input PDF or image file(s), imported in the order given
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output PDF file (defaults to the configured output name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Move a page, FROM:TO (1-based, applied first)
        #[arg(long = "move", value_parser = parse_move)]
        moves: Vec<(usize, usize)>,

        /// Rotate a page a quarter turn clockwise (1-based, repeat to turn further)
        #[arg(long)]
        rotate: Vec<usize>,

        /// Rotate every page a quarter turn clockwise
        #[arg(long)]
        rotate_all: bool,

        /// Delete a page (1-based, applied last)
        #[arg(long)]
        delete: Vec<usize>,

        /// Export options JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the effective export options to a JSON file
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Watermark text stamped diagonally on every page
        #[arg(long)]
        watermark: Option<String>,

        /// Watermark colour as #RRGGBB
        #[arg(long)]
        color: Option<String>,

        /// Watermark opacity between 0 and 1
        #[arg(long)]
        opacity: Option<f32>,

        /// Print the page list and exit without writing a PDF
        #[arg(long)]
        list: bool,
    },
}

fn parse_move(value: &str) -> std::result::Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("'{}' is not a page number", s))
    };
    Ok((parse(from)?, parse(to)?))
}

/// Front end side of the worker channels; keeps the latest state
struct Client {
    commands: mpsc::UnboundedSender<SessionCommand>,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    view: Option<SessionView>,
}

impl Client {
    async fn next(&mut self) -> Result<SessionUpdate> {
        self.updates.recv().await.context("Session worker stopped")
    }

    /// Send a command and wait for the state it produced
    async fn apply(&mut self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow::anyhow!("Session worker stopped"))?;

        loop {
            match self.next().await? {
                SessionUpdate::State(view) => {
                    self.view = Some(view);
                    return Ok(());
                }
                SessionUpdate::Ignored { command } => {
                    log::warn!("Nothing to {}", command);
                    return Ok(());
                }
                SessionUpdate::Imported {
                    pages_added,
                    failures,
                } => {
                    for failure in &failures {
                        log::warn!("Skipped {}: {}", failure.name, failure.message);
                    }
                    log::info!("Imported {} page(s)", pages_added);
                }
                SessionUpdate::Busy { command } => bail!("Cannot {} while exporting", command),
                SessionUpdate::Error { message } => bail!(message),
                other => log::debug!("Unexpected update: {:?}", other),
            }
        }
    }

    fn pages(&self) -> &[pdf_assemble::PageDescriptor] {
        self.view.as_ref().map(|v| v.pages.as_slice()).unwrap_or_default()
    }

    /// Resolve a 1-based position to a page id
    fn page_at(&self, position: usize) -> Option<PageId> {
        let id = position
            .checked_sub(1)
            .and_then(|index| self.pages().get(index))
            .map(|page| page.id);
        if id.is_none() {
            log::warn!(
                "Page {} does not exist (document has {} pages)",
                position,
                self.pages().len()
            );
        }
        id
    }

    async fn export(&mut self, options: ExportOptions, output: PathBuf) -> Result<()> {
        self.commands
            .send(SessionCommand::Export {
                options,
                output_path: Some(output),
            })
            .map_err(|_| anyhow::anyhow!("Session worker stopped"))?;

        loop {
            match self.next().await? {
                SessionUpdate::ExportStarted => log::debug!("Export started"),
                SessionUpdate::Exported {
                    page_count,
                    skipped,
                    path,
                    ..
                } => {
                    for page in &skipped {
                        log::warn!("Left out {}: {}", page.page_id, page.reason);
                    }
                    if let Some(path) = path {
                        println!("Assembled {} page(s) → {}", page_count, path.display());
                    }
                    return Ok(());
                }
                SessionUpdate::Error { message } => bail!(message),
                other => log::debug!("Unexpected update: {:?}", other),
            }
        }
    }
}

/// Export options from the config file, overridden by individual flags
async fn resolve_options(
    config: Option<PathBuf>,
    watermark: Option<String>,
    color: Option<String>,
    opacity: Option<f32>,
) -> Result<ExportOptions> {
    let mut options = match config {
        Some(path) => ExportOptions::load(&path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ExportOptions::default(),
    };

    if watermark.is_some() || color.is_some() || opacity.is_some() {
        let wm = options
            .watermark
            .get_or_insert_with(WatermarkOptions::default);
        if let Some(text) = watermark {
            wm.text = text;
        }
        if let Some(color) = color {
            wm.color_hex = color;
        }
        if let Some(opacity) = opacity {
            wm.opacity = opacity;
        }
    }

    options.validate()?;
    Ok(options)
}

fn print_pages(view: &SessionView) {
    println!("{} page(s)", view.pages.len());
    for (index, page) in view.pages.iter().enumerate() {
        let (width, height) = page.displayed_size();
        println!(
            "  {:>3}. {} page {} rotated {}° ({:.0} × {:.0})",
            index + 1,
            page.source_file,
            page.source_page_index + 1,
            page.rotation.degrees(),
            width,
            height
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let logger = CliLogger::new(200, level);
    logger.clone().init()?;

    match cli.command {
        Commands::Assemble {
            input,
            output,
            moves,
            rotate,
            rotate_all,
            delete,
            config,
            save_config,
            watermark,
            color,
            opacity,
            list,
        } => {
            let options = resolve_options(config, watermark, color, opacity).await?;
            if let Some(path) = &save_config {
                options.save(path).await?;
                println!("Saved options → {}", path.display());
            }

            let (commands, updates, worker) = spawn_worker();
            let mut client = Client {
                commands,
                updates,
                view: None,
            };

            client.apply(SessionCommand::ImportPaths { paths: input }).await?;
            if client.pages().is_empty() {
                bail!("No pages could be imported");
            }

            for (from, to) in moves {
                client
                    .apply(SessionCommand::MovePage {
                        from: from - 1,
                        to: to - 1,
                    })
                    .await?;
            }

            for position in rotate {
                if let Some(id) = client.page_at(position) {
                    client.apply(SessionCommand::Rotate { id }).await?;
                }
            }

            if rotate_all {
                client.apply(SessionCommand::SelectAll).await?;
                client.apply(SessionCommand::RotateSelected).await?;
                client.apply(SessionCommand::ClearSelection).await?;
            }

            // Resolve every position before the first deletion shifts them
            let doomed: Vec<PageId> = delete.iter().filter_map(|&p| client.page_at(p)).collect();
            for id in doomed {
                client.apply(SessionCommand::Delete { id }).await?;
            }

            if list {
                if let Some(view) = &client.view {
                    print_pages(view);
                }
            } else {
                let output = output.unwrap_or_else(|| PathBuf::from(options.file_name()));
                client.export(options, output).await?;
            }

            drop(client);
            worker.await?;
        }
    }

    let warning_count = logger.warning_count();
    if warning_count > 0 {
        eprintln!("{} warning(s)", warning_count);
        for entry in logger.warnings() {
            eprintln!("  {}", entry.message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("1:3"), Ok((1, 3)));
        assert_eq!(parse_move(" 4 : 2 "), Ok((4, 2)));
        assert!(parse_move("0:2").is_err());
        assert!(parse_move("3").is_err());
        assert!(parse_move("a:b").is_err());
    }

    #[test]
    fn test_cli_parses_assemble() {
        let cli = Cli::try_parse_from([
            "pdft", "assemble", "-i", "a.pdf", "-i", "b.png", "--move", "2:1", "--rotate", "1",
            "--rotate", "1", "--delete", "2", "--watermark", "DRAFT", "--opacity", "0.3",
        ])
        .unwrap();

        let Commands::Assemble {
            input,
            moves,
            rotate,
            delete,
            watermark,
            opacity,
            ..
        } = cli.command;
        assert_eq!(input, vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")]);
        assert_eq!(moves, vec![(2, 1)]);
        assert_eq!(rotate, vec![1, 1]);
        assert_eq!(delete, vec![2]);
        assert_eq!(watermark.as_deref(), Some("DRAFT"));
        assert_eq!(opacity, Some(0.3));
    }

    #[tokio::test]
    async fn test_flags_override_defaults() {
        let options = resolve_options(None, None, Some("#000000".to_string()), None)
            .await
            .unwrap();
        let wm = options.watermark.unwrap();
        assert_eq!(wm.text, pdf_assemble::DEFAULT_WATERMARK_TEXT);
        assert_eq!(wm.color_hex, "#000000");

        assert!(resolve_options(None, None, None, Some(2.0)).await.is_err());
        assert!(resolve_options(None, None, None, None).await.unwrap().watermark.is_none());
    }
}
