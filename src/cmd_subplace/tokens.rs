use clap::*;
use std::io::Write;
use subplace::libs::place::Backbone;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("tokens")
        .about("Number the edges of the backbone")
        .after_help(
            r###"
Prints the backbone the way it appears in the `tree` field of the jplace
output: derooted if the root is bifurcating, every edge followed by its
number in braces. Edges are numbered in post-order, starting at 0.

With `--labels`, leaves are written as `label%%token` instead and internal
edges are not numbered, as in the subtrees handed to pplacer.

Examples:
1. subplace tokens tree.nwk

2. subplace tokens tree.nwk --labels

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .action(ArgAction::SetTrue)
                .help("Append tokens to leaf labels"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = subplace::writer(args.get_one::<String>("outfile").unwrap())?;
    let backbone = Backbone::from_file(args.get_one::<String>("infile").unwrap())?;

    let out_string = if args.get_flag("labels") {
        backbone.tree().to_newick_token_labels()
    } else {
        backbone.jplace_tree()
    };
    writer.write_all((out_string + "\n").as_ref())?;

    Ok(())
}
