extern crate clap;
use clap::*;
use tracing_subscriber::EnvFilter;

mod cmd_subplace;

fn main() -> anyhow::Result<()> {
    let app = Command::new("subplace")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`subplace` - Phylogenetic placement on local subtrees")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("More log messages on stderr, repeat for debug output"),
        )
        .subcommand(cmd_subplace::place::make_subcommand())
        .subcommand(cmd_subplace::closest::make_subcommand())
        .subcommand(cmd_subplace::subtree::make_subcommand())
        .subcommand(cmd_subplace::tokens::make_subcommand())
        .subcommand(cmd_subplace::map::make_subcommand())
        .after_help(
            r###"Subcommands:

* Placement:
    * place   - Place queries on subtrees with pplacer, report on the backbone
    * map     - Map an existing subtree placement onto the backbone

* Building blocks:
    * tokens  - The backbone as written in jplace output, with edge numbers
    * closest - Reference sequences closest to each query
    * subtree - The subtree extracted around a taxon

Log level: -v for info, -vv for debug, or RUST_LOG.

"###,
        );

    let matches = app.get_matches();
    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("place", sub_matches)) => cmd_subplace::place::execute(sub_matches),
        Some(("closest", sub_matches)) => cmd_subplace::closest::execute(sub_matches),
        Some(("subtree", sub_matches)) => cmd_subplace::subtree::execute(sub_matches),
        Some(("tokens", sub_matches)) => cmd_subplace::tokens::execute(sub_matches),
        Some(("map", sub_matches)) => cmd_subplace::map::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
