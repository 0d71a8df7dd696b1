use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Use this database instead of the configured one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub db: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the content tables
    Init,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// Print the effective configuration
    Config,

    /// List content entries
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Content type: post, page, media or any custom type
        #[arg(short = 't', long = "type", default_value = "post")]
        kind: String,

        /// Only list entries with this status
        #[arg(short, long, conflicts_with = "any_status")]
        status: Option<String>,

        /// List entries of every status
        #[arg(long)]
        any_status: bool,

        /// Custom field filter, KEY<op>VALUE with op one of
        /// = != > >= < <= ~ (LIKE) !~ (NOT LIKE).
        /// Comma separated values match any of them.
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Base column filter, same syntax as --field
        #[arg(short, long = "attr")]
        attrs: Vec<String>,

        /// Order by a base column, COLUMN[:asc|desc]
        #[arg(short, long)]
        order: Option<String>,

        /// Order by a custom field, KEY[:asc|desc]
        #[arg(long, conflicts_with = "order")]
        order_field: Option<String>,

        /// Compare --order-field values as numbers
        #[arg(long, requires = "order_field")]
        numeric: bool,

        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u64,

        /// Entries per page
        #[arg(long)]
        per_page: Option<u64>,

        /// Print the generated SQL instead of running it
        #[arg(long)]
        sql: bool,
    },

    /// Show one entry with its custom fields
    #[command(arg_required_else_help = true)]
    Show {
        /// Entry id
        id: i64,

        /// Show a taxonomy term instead of a post
        #[arg(long)]
        taxonomy: Option<String>,

        /// Content type used to label the entry
        #[arg(short = 't', long = "type", default_value = "post")]
        kind: String,
    },

    /// Create a content entry
    Create {
        /// Content type: post, page, media or any custom type
        #[arg(short = 't', long = "type", default_value = "post")]
        kind: String,

        /// Title of the entry
        #[arg(long)]
        title: Option<String>,

        /// Base column values, COLUMN=VALUE
        #[arg(short, long = "attr")]
        attrs: Vec<String>,

        /// Custom field values, KEY=VALUE; VALUE is parsed as JSON when it can be
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Create a taxonomy term
    Term {
        /// Term name
        name: String,

        /// Taxonomy the term belongs to
        #[arg(long, default_value = "category")]
        taxonomy: String,

        /// Term description
        #[arg(long)]
        description: Option<String>,
    },

    /// Print site options, or set them with KEY=VALUE pairs
    Options {
        /// Options to set, KEY=VALUE
        pairs: Vec<String>,

        /// Remove these options
        #[arg(long)]
        unset: Vec<String>,
    },
}
