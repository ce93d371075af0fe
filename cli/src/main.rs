use clap::Parser;
use wsrb_cli::Command;

#[derive(Debug, Parser)]
#[clap(name = "wsrb", version)]
pub struct App {
  #[clap(subcommand)]
  command: Command,
}

fn main() -> anyhow::Result<()> {
  let app = App::parse();
  app.command.execute()?;
  Ok(())
}
