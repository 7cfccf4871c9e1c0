use clap::*;
use std::io::Write;
use subplace::libs::place::mapper::{map_placements, EngineTree};
use subplace::libs::place::{Assembler, Backbone, JplaceDocument};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("map")
        .about("Map placements on a subtree onto the backbone")
        .after_help(
            r###"
Takes a jplace file computed on a subtree of the backbone, e.g. by running
pplacer on the output of `subplace subtree`, and writes the same placements
with backbone edge numbers.

Leaf labels of the subtree are matched to backbone leaves. A `%%token`
suffix, if present, must agree with the backbone.

For a placement on a subtree edge, the nearest leaf on each side of the edge
is found. The placement is moved the same distance along the backbone path
between those two leaves. Only `edge_num` and `distal_length` change.

Examples:
1. subplace map tree.nwk sub.jplace -o backbone.jplace

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
            Arg::new("jplace")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Placements on a subtree. [stdin] for standard input"),
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
    let backbone = Backbone::from_file(args.get_one::<String>("tree").unwrap())?;
    let infile = args.get_one::<String>("jplace").unwrap();
    let doc = JplaceDocument::from_file(infile)?;

    //----------------------------
    // Operating
    //----------------------------
    let local = EngineTree::parse(&doc.tree)?;
    let invocation = std::env::args().collect::<Vec<_>>().join(" ");
    let mut asm = Assembler::new(&backbone, &invocation);

    for (i, placement) in doc.placements.iter().enumerate() {
        let records = placement.records(&doc.fields)?;
        let mapped = map_placements(&backbone, &local, &records)?;
        let names = placement.names();
        let query = names
            .first()
            .cloned()
            .unwrap_or_else(|| format!("placement {}", i + 1));
        asm.add(&query, names, &mapped);
    }

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(asm.finish().to_json()?.as_bytes())?;
    writer.write_all(b"\n")?;

    Ok(())
}
