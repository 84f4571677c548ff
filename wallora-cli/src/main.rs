use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use wallora_cli::WalloraCliApp;
use wallora_core::ScreenTarget;

#[derive(Parser)]
#[command(name = "wallora")]
#[command(about = "Wallora - set wallpapers and query display metadata")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Set the wallpaper from an image file or a raw image byte dump
    Set {
        /// Image path or content:// URI (wins over --bytes-file)
        #[arg(long)]
        path: Option<String>,
        /// File whose raw bytes are sent as imageBytes
        #[arg(long)]
        bytes_file: Option<PathBuf>,
        /// lock, home, both or 1-3
        #[arg(long, default_value = "both")]
        screen: ScreenTarget,
    },
    /// Print the OS API level
    SdkVersion,
    /// Print the desired wallpaper dimensions as JSON
    Dimensions,
    /// Answer JSON method calls from stdin, one per line
    Serve,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let app = WalloraCliApp::new()?;

    match args.command {
        Command::Set {
            path,
            bytes_file,
            screen,
        } => {
            app.set_wallpaper(path.as_deref(), bytes_file.as_deref(), screen)?;
            println!("true");
        }
        Command::SdkVersion => {
            println!("{}", app.bridge().sdk_version());
        }
        Command::Dimensions => {
            println!("{}", serde_json::to_string(&app.bridge().wallpaper_dimensions())?);
        }
        Command::Serve => {
            let stdin = io::stdin();
            let handled = app.serve(stdin.lock(), io::stdout().lock())?;
            log::info!("Handled {} method calls", handled);
        }
    }

    Ok(())
}
