//! Command-line entry points.
//!
//! | Command    | Purpose                                         |
//! |------------|-------------------------------------------------|
//! | `serve`    | HTTP server accepting only current hashed paths |
//! | `path`     | Print hashed paths for template authors         |
//! | `unhash`   | Verify hashed paths                             |
//! | `manifest` | JSON map of every asset to its hashed path      |

mod args;

pub use args::{AssetArgs, Cli, Commands};

use crate::config::Config;
use crate::fileset::{DirFileSet, FileSetHandle};
use crate::hash::HashFs;
use crate::log;
use crate::serve::HttpServer;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Run the parsed command against a loaded config.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let fs = HashFs::new(FileSetHandle::new(DirFileSet::new(&config.assets.root)));

    match &cli.command {
        Commands::Serve { .. } => serve(fs, config),
        Commands::Path { files, .. } => print_paths(&fs, files, &mut std::io::stdout().lock()),
        Commands::Unhash { paths, .. } => {
            print_unhashed(&fs, paths, &mut std::io::stdout().lock())
        }
        Commands::Manifest { output, .. } => match output {
            Some(path) => write_manifest_file(&fs, path),
            None => write_manifest(&fs, &mut std::io::stdout().lock()),
        },
    }
}

/// Serve the asset root until Ctrl+C.
fn serve(fs: HashFs, config: &Config) -> Result<()> {
    let server = HttpServer::bind(config.serve.interface, config.serve.port)?;

    let shutdown = server.shutdown_handle();
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        shutdown.shutdown();
    })
    .context("failed to set Ctrl+C handler")?;

    log!("serve"; "http://{} ({})", server.addr(), config.assets.root.display());

    let handler = Arc::new(fs.file_server(config.static_options()));
    server.run(handler, config.serve.threads)
}

fn print_paths(fs: &HashFs, files: &[String], out: &mut impl Write) -> Result<()> {
    for file in files {
        let hashed = fs.try_path(file)?;
        writeln!(out, "{hashed}")?;
    }
    Ok(())
}

fn print_unhashed(fs: &HashFs, paths: &[String], out: &mut impl Write) -> Result<()> {
    for path in paths {
        let filename = fs.unhashed(path)?;
        writeln!(out, "{filename}")?;
    }
    Ok(())
}

fn write_manifest(fs: &HashFs, out: &mut impl Write) -> Result<()> {
    let manifest = fs.manifest()?;
    serde_json::to_writer_pretty(&mut *out, &manifest)?;
    writeln!(out)?;
    Ok(())
}

fn write_manifest_file(fs: &HashFs, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_manifest(fs, &mut file)?;
    log!("manifest"; "wrote {}", path.display());
    Ok(())
}
