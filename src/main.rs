use clap::Parser;
use env_logger::Env;
use log::{error, info};

mod args;
mod page;
mod server;

use crate::args::{Args, Command};
use crate::page::{error_chain, run_render, PageLoad};
use crate::server::run_serve;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let res = match &args.command {
        Command::Render(render_args) => run_render(render_args, args.config.as_deref())
            .await
            .map(|outcome| {
                if outcome == PageLoad::FeedUnavailable {
                    info!("The page was written without participant cards");
                }
            }),
        Command::Serve(serve_args) => run_serve(serve_args, args.config.as_deref()).await,
    };

    if let Err(e) = res {
        error!("{}", e);
        eprintln!("Error: {}", error_chain(&e));
        std::process::exit(1);
    }
}
