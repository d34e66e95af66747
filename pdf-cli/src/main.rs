use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;

use pdfpage_core::{create_pdf, modify_pdf, Config, DocumentJob};

#[derive(Parser, Debug)]
#[command(version, about = "Draw text, shapes and images onto PDF pages from JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new PDF from the job's `pages`.
    Create(JobArgs),
    /// Draw the job's `modifyPages` over an existing PDF and append its `pages`.
    Modify(JobArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// JSON job file: {"path": ..., "pages": [...], "modifyPages": [...]}
    job: PathBuf,

    /// Write to this path instead of the job's `path`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON config file (default font, media box, compression, ...).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl JobArgs {
    fn load(&self) -> Result<(DocumentJob, Config)> {
        let job = DocumentJob::from_file(&self.job)
            .with_context(|| format!("reading job {}", self.job.display()))?;
        let config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => Config::default(),
        };
        debug!("config: {:?}", config);
        Ok((job, config))
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("pdfpage=info,pdfpage_core=info");
    env_logger::Builder::from_env(env).init();

    let cli = Cli::parse();
    let written = match cli.command {
        Command::Create(args) => {
            let (mut job, config) = args.load()?;
            if let Some(output) = args.output {
                job.path = output;
            }
            create_pdf(&job, &config)
                .with_context(|| format!("creating {}", job.path.display()))?
        }
        Command::Modify(args) => {
            let (mut job, config) = args.load()?;
            if let Some(output) = args.output {
                // Leave the source untouched and modify a copy.
                std::fs::copy(&job.path, &output).with_context(|| {
                    format!("copying {} to {}", job.path.display(), output.display())
                })?;
                job.path = output;
            }
            modify_pdf(&job, &config)
                .with_context(|| format!("modifying {}", job.path.display()))?
        }
    };

    println!("{}", written.display());
    Ok(())
}
