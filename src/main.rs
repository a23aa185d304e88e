use clap::Parser;
use tuicraft::frontend::cli::{main::run, models::Cli};
use tuicraft::utils::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_from_env(cli.verbose);

    run(cli).await
}
