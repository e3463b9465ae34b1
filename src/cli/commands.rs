use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in to a server and store the session token
    Login {
        /// Server URL
        #[arg(long)]
        server: Option<String>,

        /// Username
        #[arg(long)]
        username: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Clear stored credentials
    Logout,
}

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Submit a shift record, filling in the section's detail form
    Submit {
        /// Section name (e.g. "CCS")
        #[arg(long)]
        section: Option<String>,

        /// Shift name (e.g. "1st Shift")
        #[arg(long)]
        shift: Option<String>,

        /// Skip interactive prompts (submits the saved draft as-is)
        #[arg(long)]
        non_interactive: bool,
    },

    /// List your own records, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record with its detail
    Show {
        /// Record ID
        id: String,
    },
}

/// Filters for the report command. Dates are inclusive on both ends.
#[derive(Args)]
pub struct ReportArgs {
    /// Section name filter
    #[arg(long)]
    pub section: Option<String>,

    /// Shift name filter
    #[arg(long)]
    pub shift: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum SectionCommands {
    /// Create a section
    Create {
        /// Section name
        #[arg(long)]
        name: Option<String>,

        /// Skip interactive prompts (requires --name)
        #[arg(long)]
        non_interactive: bool,
    },

    /// List sections
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a section
    Rename {
        /// Section ID
        id: String,

        /// New name
        #[arg(long)]
        name: String,
    },

    /// Delete a section
    Delete {
        /// Section ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ShiftCommands {
    /// Create a shift
    Create {
        /// Shift name
        #[arg(long)]
        name: Option<String>,

        /// Start time (HH:MM:SS)
        #[arg(long)]
        start_time: Option<String>,

        /// End time (HH:MM:SS)
        #[arg(long)]
        end_time: Option<String>,

        /// Skip interactive prompts (requires --name, --start-time, --end-time)
        #[arg(long)]
        non_interactive: bool,
    },

    /// List shifts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a shift's name or times
    Update {
        /// Shift ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New start time (HH:MM:SS)
        #[arg(long)]
        start_time: Option<String>,

        /// New end time (HH:MM:SS)
        #[arg(long)]
        end_time: Option<String>,
    },

    /// Delete a shift
    Delete {
        /// Shift ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Create {
        /// Username
        #[arg(long)]
        username: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Role name (SuperAdmin, Admin, User)
        #[arg(long)]
        role: Option<String>,

        /// Section name to assign
        #[arg(long)]
        section: Option<String>,

        /// Skip interactive prompts (requires --username, --password, --role)
        #[arg(long)]
        non_interactive: bool,
    },

    /// List users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a user
    Update {
        /// User ID
        id: String,

        /// New username
        #[arg(long)]
        username: Option<String>,

        /// New password
        #[arg(long)]
        password: Option<String>,

        /// New role name (SuperAdmin only)
        #[arg(long)]
        role: Option<String>,

        /// New section name ("none" clears the assignment)
        #[arg(long)]
        section: Option<String>,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
