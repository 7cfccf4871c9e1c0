use clap::*;
use std::io::Write;
use subplace::libs::place::extract::{extract, SubtreeKind};
use subplace::libs::place::Backbone;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("subtree")
        .about("Extract the subtree around a taxon")
        .after_help(
            r###"
Grows a subtree of `--size` leaves around one leaf of the backbone, the way
`subplace place` does for each query, and prints it.

* d: leaves closest to the taxon by path length
* n: leaves closest to the taxon by number of edges

Leaves are written as `label%%token`, the token being the number of the
leaf's edge in the backbone (see `subplace tokens`). `--plain` drops it.

Examples:
1. 10 leaves around Human:
   subplace subtree tree.nwk -n Human -b 10

2. By number of edges, plain labels:
   subplace subtree tree.nwk -n Human -b 10 -s n --plain

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
            Arg::new("node")
                .long("node")
                .short('n')
                .required(true)
                .num_args(1)
                .help("Leaf the subtree grows from"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .short('b')
                .num_args(1)
                .default_value("2000")
                .value_parser(value_parser!(usize))
                .help("Number of leaves in the subtree"),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .short('s')
                .num_args(1)
                .default_value("d")
                .value_parser(["d", "n"])
                .help("How subtree leaves are chosen"),
        )
        .arg(
            Arg::new("plain")
                .long("plain")
                .action(ArgAction::SetTrue)
                .help("Write leaf labels without tokens"),
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
    //----------------------------
    // Args
    //----------------------------
    let mut writer = subplace::writer(args.get_one::<String>("outfile").unwrap())?;
    let node = args.get_one::<String>("node").unwrap();
    let size = *args.get_one::<usize>("size").unwrap();
    let kind: SubtreeKind = args
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(anyhow::Error::msg)?;
    let is_plain = args.get_flag("plain");

    let backbone = Backbone::from_file(args.get_one::<String>("infile").unwrap())?;

    //----------------------------
    // Operating
    //----------------------------
    let subtree = extract(&backbone, kind, size, std::slice::from_ref(node))?;
    let out_string = if is_plain {
        subtree.tree.to_newick()
    } else {
        subtree.to_newick()
    };
    writer.write_all((out_string + "\n").as_ref())?;

    Ok(())
}
