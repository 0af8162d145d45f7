//! CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{adapter::StoreBackend, domain::{ProcessStatus, Role}};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Email of the acting persona (falls back to the OS username)
    #[arg(long, global = true, env = "BPM_ACTOR")]
    pub actor: Option<String>,

    /// Storage backend override for this invocation
    #[arg(long, global = true, value_enum)]
    pub backend: Option<StoreBackend>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration directory and default config file
    Init,
    /// Load organizations, personas and reference entities from a YAML file
    Seed {
        /// Path to the seed YAML file
        file: PathBuf
    },
    /// Process management commands
    Process {
        #[command(subcommand)]
        command: ProcessCommands
    },
    /// Process role management commands
    Role {
        #[command(subcommand)]
        command: RoleCommands
    },
    /// Persona management commands
    Persona {
        #[command(subcommand)]
        command: PersonaCommands
    }
}

#[derive(Subcommand)]
pub enum ProcessCommands {
    /// Create a process in the actor's organization
    Create {
        name:         String,
        #[arg(long, default_value = "")]
        description:  String,
        #[arg(long, default_value = "")]
        category:     String,
        /// Initial status (defaults to draft)
        #[arg(long, value_enum)]
        status:       Option<ProcessStatus>,
        /// Referenced activity ids (repeatable)
        #[arg(long = "activity")]
        activity_ids: Vec<u64>,
        /// Referenced arch ids (repeatable)
        #[arg(long = "arch")]
        arch_ids:     Vec<u64>,
        /// Referenced gateway ids (repeatable)
        #[arg(long = "gateway")]
        gateway_ids:  Vec<u64>
    },
    /// List the processes of the actor's organization
    List {
        /// Only show processes with this status
        #[arg(long, value_enum)]
        status: Option<ProcessStatus>
    },
    /// Show one process
    Get { id: u64 },
    /// Update fields of a process; omitted fields are left unchanged
    Update {
        id:           u64,
        #[arg(long)]
        name:         Option<String>,
        #[arg(long)]
        description:  Option<String>,
        #[arg(long)]
        category:     Option<String>,
        #[arg(long, value_enum)]
        status:       Option<ProcessStatus>,
        /// Replace the activity list (repeatable)
        #[arg(long = "activity")]
        activity_ids: Option<Vec<u64>>,
        /// Replace the arch list (repeatable)
        #[arg(long = "arch")]
        arch_ids:     Option<Vec<u64>>,
        /// Replace the gateway list (repeatable)
        #[arg(long = "gateway")]
        gateway_ids:  Option<Vec<u64>>
    },
    /// Deactivate a process, or remove it permanently with --hard
    Delete {
        id:   u64,
        /// Permanently remove the process and its history (ADMIN only)
        #[arg(long)]
        hard: bool
    },
    /// Show the audit trail of a process, newest first
    History { id: u64 }
}

#[derive(Subcommand)]
pub enum RoleCommands {
    /// Create a role in the actor's organization
    Create { name: String },
    /// List the roles of the actor's organization
    List,
    /// Rename a role
    Update {
        id:   u64,
        #[arg(long)]
        name: Option<String>
    },
    /// Delete a role (refused while it is assigned to any activity)
    Delete { id: u64 },
    /// Assign a role to an activity
    Assign { activity: u64, role: u64 },
    /// Remove a role from an activity
    Unassign { activity: u64, role: u64 },
    /// Show the activities and processes where a role is used
    Usage { id: u64 }
}

#[derive(Subcommand)]
pub enum PersonaCommands {
    /// Register a persona
    Register {
        name:         String,
        email:        String,
        #[arg(long, value_enum, default_value = "viewer")]
        role:         Role,
        /// Organization id the persona belongs to
        #[arg(long)]
        organization: Option<u64>
    },
    /// List all personas
    List,
    /// Show a persona by email
    Show { email: String },
    /// Remove a persona
    Delete { id: u64 }
}
