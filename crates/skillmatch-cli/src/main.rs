use clap::Parser;
use skillmatch_cli::{CliArgs, SkillmatchCli};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let result = match SkillmatchCli::from_args("skillmatch", &args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
