use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = instafilter::Cli::parse();
    instafilter::init_logger(cli.verbose);
    instafilter::run(cli)
}
