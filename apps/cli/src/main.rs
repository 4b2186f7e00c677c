use anyhow::Result;
use clap::Parser;
use shadowforge_engine::Selection;
use shadowforge_host_windows::VssProvider;

mod cli;
mod commands;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let parsed = cli::Cli::parse();
    let provider = VssProvider::connect()?;
    let mut selection = Selection::new();

    match parsed.cmd {
        cli::Cmd::ListVolumes { pretty } => commands::list_volumes(&provider, pretty),

        cli::Cmd::ListSnapshots {
            reference,
            strict_match,
            pretty,
        } => commands::list_snapshots(&provider, &mut selection, reference, strict_match, pretty),

        cli::Cmd::CreateSnapshot {
            reference,
            description,
        } => commands::create_snapshot(&provider, &mut selection, reference, description),

        cli::Cmd::DeleteSnapshot {
            reference,
            id,
            yes,
            strict_match,
        } => commands::delete_snapshot(&provider, &mut selection, reference, id, yes, strict_match),
    }
}
