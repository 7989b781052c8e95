// src/args.rs
use clap::{Parser, Subcommand};
use cidtui::api::ExportKind;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "cidtui", version, about = "Browse IPFS content through a gateway backend")]
pub struct Args {
    /// Backend base URL, overrides the config file and CIDTUI_API_BASE.
    #[clap(long, value_name = "URL")]
    pub api: Option<String>,
    /// Log level; the browser defaults to off, subcommands to info.
    #[clap(long, value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,
    /// CID or CID/path to open on start.
    pub query: Option<String>,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a directory CID.
    Ls {
        query: String,
        #[clap(long, default_value = "name")]
        sort: String,
        #[clap(long, default_value = "asc")]
        order: String,
        /// Include dotfiles.
        #[clap(short, long)]
        all: bool,
        #[clap(long)]
        filter: Option<String>,
    },
    /// Show metadata for a CID.
    Meta { cid: String },
    History {
        /// Remove this CID from history instead of listing.
        #[clap(long, value_name = "CID")]
        delete: Option<String>,
    },
    Bookmarks {
        #[clap(long, value_name = "CID")]
        delete: Option<String>,
    },
    Uploads {
        #[clap(long, value_name = "CID")]
        delete: Option<String>,
    },
    Groups,
    Group {
        #[clap(subcommand)]
        action: GroupAction,
    },
    Analytics {
        #[clap(subcommand)]
        action: AnalyticsAction,
    },
    /// Upload a file or directory.
    Upload {
        path: PathBuf,
        #[clap(long)]
        private: bool,
    },
    Download {
        cid: String,
        #[clap(short, long)]
        output: Option<String>,
    },
    /// Check whether a string is a well-formed CID.
    Validate { cid: String },
    /// Print the effective configuration.
    Config {
        /// Write it to the config file.
        #[clap(long)]
        save: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum GroupAction {
    Show { id: i64 },
    Create { name: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
    Add { id: i64, cid: String },
    Remove { id: i64, cid: String },
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsAction {
    Dashboard {
        #[clap(long)]
        days: Option<u32>,
    },
    Realtime {
        /// Keep polling until interrupted.
        #[clap(long)]
        watch: bool,
    },
    Cid {
        cid: String,
        #[clap(long, default_value_t = cidtui::analytics::CID_DEFAULT_DAYS)]
        days: u32,
    },
    Export {
        #[clap(value_parser = parse_export_kind)]
        kind: ExportKind,
        #[clap(long)]
        days: Option<u32>,
        #[clap(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn parse_export_kind(kind: &str) -> Result<ExportKind, String> {
    ExportKind::parse(kind).ok_or_else(|| format!("unknown export kind {}, expected views, downloads or traffic", kind))
}
