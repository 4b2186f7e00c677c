use clap::{Parser, Subcommand};

/// Shadow copy administration for local fixed volumes.
#[derive(Parser, Debug)]
#[command(name = "shadowforge", version, about = "List, create and delete volume shadow copies")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// List the supported volumes (fixed, letter-assigned) as JSON
    ListVolumes {
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// List shadow copies of a volume as JSON
    ListSnapshots {
        /// Drive letter (C, C:, C:\) or device identifier; omit to reuse the
        /// current selection
        reference: Option<String>,
        /// Disable the substring linkage-match fallback
        #[arg(long, default_value_t = false)]
        strict_match: bool,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Create a client-accessible shadow copy of a volume
    CreateSnapshot {
        /// Drive letter or device identifier; omit to reuse the current
        /// selection
        reference: Option<String>,
        /// Free-text note recorded with the operation log
        description: Option<String>,
    },
    /// Delete shadow copies of a volume, or one specific shadow copy
    DeleteSnapshot {
        /// Drive letter or device identifier; omit to reuse the current
        /// selection
        reference: Option<String>,
        /// Delete only the shadow copy with this exact identifier
        #[arg(long)]
        id: Option<String>,
        /// Skip the interactive confirmation
        #[arg(long, default_value_t = false)]
        yes: bool,
        /// Disable the substring linkage-match fallback
        #[arg(long, default_value_t = false)]
        strict_match: bool,
    },
}
