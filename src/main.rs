use callcenter_dashboard::{
    init_errors,
    init_logging,
    App,
    Args,
    Config,
};
use clap::Parser;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    let config = Config::new(args.clone())?;
    init_logging(&config)?;
    App::new(config, args).run().await
}
