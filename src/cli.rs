use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::{Brand, ContentKind, Slot};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Brand to work on; defaults to `default_brand` from the config file
    #[arg(short, long, global = true, value_enum)]
    pub brand: Option<Brand>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with the admin API and keep the session
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Change the signed-in admin's name or email
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Browse and edit articles
    #[command(subcommand)]
    Articles(ArticlesCommand),
    /// Browse and edit features, opinions and graphics
    Posts {
        #[arg(value_enum)]
        kind: PostKind,
        #[command(subcommand)]
        command: PostsCommand,
    },
    /// Manage taxonomy sections
    #[command(subcommand)]
    Sections(SectionsCommand),
    /// Open the live-update editor for a draft file or an existing article id
    Live { target: String },
    /// Upload an image and print its URL
    Upload { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ArticlesCommand {
    /// List one page of articles, optionally filtered
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        category: Option<String>,
        /// Section id
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Show one article
    Get { id: String },
    Search {
        term: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show a home page slot, or all four when none is given
    Slot {
        #[arg(value_enum)]
        slot: Option<Slot>,
    },
    /// Create an article from a TOML draft file
    Create { draft: PathBuf },
    /// Change fields of an existing article
    Edit(EditArticle),
    Delete { id: String },
}

#[derive(Args, Debug, Default)]
pub struct EditArticle {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Comma separated; replaces the current subcategories
    #[arg(long)]
    pub subcategories: Option<String>,
    /// Comma separated; replaces the current tags
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub creator: Option<String>,
    #[arg(long)]
    pub breaking: Option<bool>,
    #[arg(long)]
    pub headline: Option<bool>,
    #[arg(long)]
    pub topstory: Option<bool>,
    /// Section id, or an empty string to clear it
    #[arg(long)]
    pub section: Option<String>,
    #[arg(long)]
    pub livescore_tag: Option<String>,
    /// New rich-text body, read from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PostKind {
    Feature,
    Opinion,
    Graphic,
}

impl From<PostKind> for ContentKind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::Feature => ContentKind::Feature,
            PostKind::Opinion => ContentKind::Opinion,
            PostKind::Graphic => ContentKind::Graphic,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PostsCommand {
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    Get {
        id: String,
    },
    Search {
        term: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Create from a TOML draft file
    Create {
        draft: PathBuf,
    },
    /// Replace from a TOML draft file
    Edit {
        id: String,
        draft: PathBuf,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct SectionFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    /// Derived from the name when left empty
    #[arg(long)]
    pub slug: Option<String>,
    /// Hex colour such as #1a2b3c
    #[arg(long)]
    pub color: Option<String>,
    /// RFC 3339 timestamp, or an empty string for no expiry
    #[arg(long)]
    pub expires_at: Option<String>,
    #[arg(long)]
    pub display_order: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum SectionsCommand {
    List {
        /// Include sections past their expiry date
        #[arg(long)]
        all: bool,
    },
    Create(SectionFields),
    Edit {
        id: String,
        #[command(flatten)]
        fields: SectionFields,
    },
    Delete {
        id: String,
    },
}
