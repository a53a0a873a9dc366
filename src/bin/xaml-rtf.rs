//! xaml-rtf - Convert between RTF documents and XAML flow content

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use xaml_rtf::{ConvertOptions, Error, rtf_to_xaml, xaml_to_rtf};

#[derive(Parser, Debug)]
#[command(name = "xaml-rtf")]
#[command(version, about = "Convert between RTF and XAML flow content", long_about = None)]
#[command(after_help = "EXAMPLES:
    xaml-rtf to-xaml letter.rtf -o letter.xaml    Convert RTF to XAML
    xaml-rtf to-rtf --strict letter.xaml          Convert XAML to RTF on stdout
    cat letter.rtf | xaml-rtf to-xaml -           Read from stdin

Set RUST_LOG=xaml_rtf=debug to see what the converter drops.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an RTF document to XAML
    ToXaml(Args),
    /// Convert XAML flow content to an RTF document
    ToRtf(Args),
}

#[derive(clap::Args, Debug)]
struct Args {
    /// Input file, or `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Reject markup RTF cannot express instead of dropping it
    #[arg(long)]
    strict: bool,

    /// ANSI code page of generated RTF
    #[arg(long, value_name = "CODEPAGE", default_value_t = 1252)]
    code_page: u32,

    /// Drop pictures instead of embedding them
    #[arg(long)]
    no_images: bool,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions::default()
            .with_strict(self.strict)
            .with_code_page(self.code_page)
            .with_embed_images(!self.no_images)
    }

    fn read_input(&self) -> anyhow::Result<Vec<u8>> {
        let mut data = Vec::new();
        if self.input.as_os_str() == "-" {
            io::stdin().read_to_end(&mut data).context("reading stdin")?;
        } else {
            data = fs::read(&self.input).with_context(|| format!("reading {}", self.input.display()))?;
        }
        Ok(data)
    }

    fn write_output(&self, converted: &str) -> anyhow::Result<()> {
        match &self.output {
            Some(path) => fs::write(path, converted).with_context(|| format!("writing {}", path.display())),
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(converted.as_bytes())?;
                stdout.write_all(b"\n")?;
                Ok(())
            },
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let (args, converted) = match &cli.command {
        Command::ToXaml(args) => {
            let input = args.read_input()?;
            (args, rtf_to_xaml(&input, &args.options())?)
        },
        Command::ToRtf(args) => {
            let input = args.read_input()?;
            let text = String::from_utf8(input).context("XAML input is not UTF-8")?;
            (args, xaml_to_rtf(&text, &args.options())?)
        },
    };
    args.write_output(&converted)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "xaml_rtf=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            // Conversion failures exit with their result code
            let code = err
                .downcast_ref::<Error>()
                .map(|e| e.kind().code())
                .unwrap_or(5);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        },
    }
}
