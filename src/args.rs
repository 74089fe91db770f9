use clap::{Parser, Subcommand};

/// Ranks the participants of a reality show and renders them as cards.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// (file path, optional) A JSON configuration file. See the manual for the accepted keys.
    /// Relative paths in this file are resolved from its directory.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetches the feed, ranks the participants and writes the page with their cards.
    Render(RenderArgs),
    /// Serves the static files of the site.
    Serve(ServeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// (file path or http(s) address) The participant feed. Overrides the `feed` key of the configuration.
    #[clap(short, long, value_parser)]
    pub feed: Option<String>,

    /// (file path) The HTML page the cards are appended to. It must contain the container element.
    #[clap(short, long, value_parser)]
    pub template: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the rendered page. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference page. If provided, the rendered page must match it exactly.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default positive) The vote count used for the ranking: positive or negative.
    #[clap(long, value_parser)]
    pub criterion: Option<String>,

    /// (default en) The language of the card labels: en or pt.
    #[clap(long, value_parser)]
    pub locale: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// (directory) The directory to serve. Defaults to `public`.
    #[clap(short, long, value_parser)]
    pub root: Option<String>,

    /// (default 7007) The port to listen to.
    #[clap(short, long, value_parser)]
    pub port: Option<u16>,
}
