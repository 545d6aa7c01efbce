//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Content-hashed asset paths and a verifying file server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: hashfs.toml)
    #[arg(short = 'C', long, global = true, default_value = "hashfs.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve assets by hashed path
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        assets: AssetArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the hashed path of each file
    #[command(visible_alias = "p")]
    Path {
        #[command(flatten)]
        assets: AssetArgs,

        /// Files relative to the asset root
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Verify hashed paths and print the original filenames
    #[command(visible_alias = "u")]
    Unhash {
        #[command(flatten)]
        assets: AssetArgs,

        /// Hashed paths relative to the asset root
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// Write a JSON map of every asset to its hashed path
    #[command(visible_alias = "m")]
    Manifest {
        #[command(flatten)]
        assets: AssetArgs,

        /// Output file (default: stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

/// Shared asset arguments for all commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AssetArgs {
    /// Asset root directory (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,
}

impl Cli {
    /// Asset arguments of the active subcommand.
    pub fn assets(&self) -> &AssetArgs {
        match &self.command {
            Commands::Serve { assets, .. }
            | Commands::Path { assets, .. }
            | Commands::Unhash { assets, .. }
            | Commands::Manifest { assets, .. } => assets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["hashfs", "serve", "-r", "dist", "-p", "8080"]);
        let Commands::Serve {
            interface, port, ..
        } = &cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(*port, Some(8080));
        assert_eq!(*interface, None);
        assert_eq!(cli.assets().root, Some(PathBuf::from("dist")));
    }

    #[test]
    fn test_parse_path_requires_files() {
        assert!(Cli::try_parse_from(["hashfs", "path"]).is_err());
        let cli = Cli::parse_from(["hashfs", "p", "a.js", "b.css", "-v"]);
        assert!(cli.verbose);
        let Commands::Path { files, .. } = &cli.command else {
            panic!("expected path");
        };
        assert_eq!(files, &["a.js", "b.css"]);
    }
}
