use clap::*;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use subplace::libs::fasta;
use subplace::libs::place::*;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("place")
        .about("Place queries on local subtrees and report them on the backbone")
        .after_help(
            r###"
Each query is placed by pplacer on a small subtree of the backbone, built
around the reference sequence closest to it. The placements are mapped back
to the backbone and written as one jplace file.

Steps for each query:
* Find the closest reference by Hamming distance (`--fragment` ignores gaps
  of the query).
* Extract a subtree of `--size` leaves:
    * d: leaves closest to that reference by path length
    * n: leaves closest to that reference by number of edges
    * h: the references closest to the query by Hamming distance
* Run `taxit create` and `pplacer -c`, or `pplacer -s -t` with `--no-refpkg`.
* Map each placement row onto the backbone edge numbers.

Queries pplacer fails on, or finds no placement for, are left out with a
warning.

Input:
* The backbone is the first tree of `--tree`, derooted if the root is
  bifurcating. Leaf labels must be unique and must not contain `%%`.
* Sequences named after a backbone leaf are references, the others are
  queries. With `--query`, queries are read from that file instead.

Output:
* <outdir>/<output>.jplace

Examples:
1. Subtrees of 2000 leaves, GTR model:
   subplace place -t backbone.nwk -i RAxML_info.txt -a aln.fa -d out

2. Separate query file, smaller subtrees picked by sequence distance:
   subplace place -t backbone.nwk -i RAxML_info.txt -a ref.fa -q query.fa \
       -d out -b 500 -s h --fragment

"###,
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .short('t')
                .required(true)
                .num_args(1)
                .help("Backbone tree, Newick"),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .short('i')
                .required(true)
                .num_args(1)
                .help("Model parameters of the backbone (RAxML info file)"),
        )
        .arg(
            Arg::new("alignment")
                .long("alignment")
                .short('a')
                .required(true)
                .num_args(1)
                .help("Aligned references, and queries unless --query is given"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .num_args(1)
                .help("Aligned queries"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('d')
                .required(true)
                .num_args(1)
                .help("Output directory"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .num_args(1)
                .default_value("subplace")
                .help("Output name, `.jplace` is appended"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .short('m')
                .num_args(1)
                .default_value("GTR")
                .help("Substitution model"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .short('b')
                .num_args(1)
                .default_value("2000")
                .value_parser(value_parser!(usize))
                .help("Number of leaves in each subtree"),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .short('s')
                .num_args(1)
                .default_value("d")
                .value_parser(["d", "n", "h"])
                .help("How subtree leaves are chosen"),
        )
        .arg(
            Arg::new("fragment")
                .long("fragment")
                .short('f')
                .action(ArgAction::SetTrue)
                .help("Queries are fragments, skip their gap columns"),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .short('n')
                .num_args(1)
                .default_value("0")
                .help("Run id, names the scratch directory"),
        )
        .arg(
            Arg::new("tmpdir")
                .long("tmpdir")
                .num_args(1)
                .help("Parent of the scratch directory [default: outdir]"),
        )
        .arg(
            Arg::new("keep-tmp")
                .long("keep-tmp")
                .action(ArgAction::SetTrue)
                .help("Keep the scratch directory"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(u64))
                .help("Seconds before an engine run is killed, 0 for no limit"),
        )
        .arg(
            Arg::new("no-refpkg")
                .long("no-refpkg")
                .action(ArgAction::SetTrue)
                .help("Call pplacer on the tree directly, without taxit"),
        )
        .arg(
            Arg::new("pplacer")
                .long("pplacer")
                .num_args(1)
                .default_value("pplacer")
                .help("pplacer executable"),
        )
        .arg(
            Arg::new("taxit")
                .long("taxit")
                .num_args(1)
                .default_value("taxit")
                .help("taxit executable"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let outdir = Path::new(args.get_one::<String>("outdir").unwrap());
    let output = args.get_one::<String>("output").unwrap();
    let tmpdir = args
        .get_one::<String>("tmpdir")
        .map(Path::new)
        .unwrap_or(outdir);

    let opts = PlaceOptions {
        kind: args.get_one::<String>("type").unwrap().parse().map_err(anyhow::Error::msg)?,
        size: *args.get_one::<usize>("size").unwrap(),
        fragment: args.get_flag("fragment"),
    };
    if opts.size < 3 {
        anyhow::bail!("--size must be at least 3");
    }

    let timeout = match *args.get_one::<u64>("timeout").unwrap() {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let taxit = if args.get_flag("no-refpkg") {
        None
    } else {
        Some(args.get_one::<String>("taxit").unwrap().as_str())
    };
    let engine = PplacerEngine::new(
        args.get_one::<String>("pplacer").unwrap(),
        taxit,
        args.get_one::<String>("model").unwrap(),
        Path::new(args.get_one::<String>("info").unwrap()),
        timeout,
    )?;

    //----------------------------
    // Load
    //----------------------------
    let backbone = Backbone::from_file(args.get_one::<String>("tree").unwrap())?;
    let (refs, queries) = fasta::load_sequences(
        args.get_one::<String>("alignment").unwrap(),
        args.get_one::<String>("query").map(|s| s.as_str()),
        backbone.leaf_map(),
    )?;

    //----------------------------
    // Operating
    //----------------------------
    std::fs::create_dir_all(outdir)?;
    let ctx = RunContext::new(tmpdir, args.get_one::<String>("run").unwrap(), args.get_flag("keep-tmp"))?;

    let invocation = std::env::args().collect::<Vec<_>>().join(" ");
    let mut asm = Assembler::new(&backbone, &invocation);
    Pipeline::new(&backbone, &refs, &engine, &ctx, opts).run(&queries, &mut asm)?;

    if !asm.skipped().is_empty() {
        tracing::warn!("{} of {} queries not placed", asm.skipped().len(), queries.len());
    }

    //----------------------------
    // Output
    //----------------------------
    let outfile = outdir.join(format!("{}.jplace", output));
    let mut writer = subplace::writer(&outfile.to_string_lossy())?;
    writer.write_all(asm.finish().to_json()?.as_bytes())?;
    writer.write_all(b"\n")?;
    tracing::info!("placements written to {}", outfile.display());

    Ok(())
}
