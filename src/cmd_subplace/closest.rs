use clap::*;
use std::io::Write;
use subplace::libs::fasta;
use subplace::libs::hamming;
use subplace::libs::place::Backbone;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("closest")
        .about("Reference sequences closest to each query")
        .after_help(
            r###"
Sequences named after a leaf of the tree are references, the others are
queries (or use `--query`).

The distance is the number of aligned columns where the query and the
reference differ, ignoring gap columns (`-`, `.`, `?`) of the reference.
With `--fragment`, gap columns of the query are ignored too.

Output is tab separated: query, reference, distance. Ties keep the order of
the references in the alignment.

Examples:
1. The closest reference of each query:
   subplace closest tree.nwk aln.fa

2. The 5 closest references of fragmentary reads:
   subplace closest tree.nwk ref.fa -q reads.fa -k 5 --fragment

"###,
        )
        .arg(
            Arg::new("tree")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Backbone tree, Newick"),
        )
        .arg(
            Arg::new("alignment")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Aligned sequences"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .num_args(1)
                .help("Aligned queries"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .short('k')
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Number of references reported per query"),
        )
        .arg(
            Arg::new("fragment")
                .long("fragment")
                .short('f')
                .action(ArgAction::SetTrue)
                .help("Queries are fragments, skip their gap columns"),
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
    let count = *args.get_one::<usize>("count").unwrap();
    let is_fragment = args.get_flag("fragment");

    let backbone = Backbone::from_file(args.get_one::<String>("tree").unwrap())?;
    let (refs, queries) = fasta::load_sequences(
        args.get_one::<String>("alignment").unwrap(),
        args.get_one::<String>("query").map(|s| s.as_str()),
        backbone.leaf_map(),
    )?;

    //----------------------------
    // Output
    //----------------------------
    for query in &queries {
        for (label, dist) in hamming::closest(&query.seq, &refs, count, is_fragment) {
            writer.write_fmt(format_args!("{}\t{}\t{}\n", query.name, label, dist))?;
        }
    }

    Ok(())
}
