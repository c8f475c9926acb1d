use clap::Parser;
use miette::Result;
use sticker_tool::cli::{Cli, Commands};
use sticker_tool::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Login => sticker_tool::cli::login::run(&cli.credentials, &printer)?,
        Commands::Logout => sticker_tool::cli::logout::run(&cli.credentials, &printer)?,
        Commands::Init(args) => sticker_tool::cli::init::run(args, &cli.dir, &printer)?,
        Commands::Download(args) => sticker_tool::cli::download::run(args, &cli.dir, &printer)?,
        Commands::Upload => sticker_tool::cli::upload::run(&cli.dir, &cli.credentials, &printer)?,
        Commands::Preview => sticker_tool::cli::preview::run(&cli.dir, &printer)?,
        Commands::Url => sticker_tool::cli::url::run(&cli.dir)?,
        Commands::Completions(args) => sticker_tool::cli::completions::run(args)?,
    }

    Ok(())
}
