//! Aligned FASTA input and output.

use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Taxon label to aligned sequence, in input order.
pub type ReferenceSet = IndexMap<String, Vec<u8>>;

/// A query sequence aligned to the reference columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

impl QueryRecord {
    pub fn new(name: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            seq: seq.into(),
        }
    }
}

/// Read every record of a FASTA file, keeping input order.
/// A repeated name is an error.
pub fn read_alignment(infile: &str) -> anyhow::Result<IndexMap<String, Vec<u8>>> {
    let reader = crate::reader(infile)?;
    let mut fa_in = noodles_fasta::io::Reader::new(reader);

    let mut seq_of = IndexMap::new();
    for result in fa_in.records() {
        let record = result?;
        let name = String::from_utf8(record.name().into())?;
        let seq: Vec<u8> = record.sequence().as_ref().to_vec();
        if seq_of.insert(name.clone(), seq).is_some() {
            anyhow::bail!("Duplicated sequence name {} in {}", name, infile);
        }
    }

    Ok(seq_of)
}

/// Split a combined alignment into references (names found among the backbone
/// leaves) and queries (everything else).
pub fn split_by_leaves(
    aln: IndexMap<String, Vec<u8>>,
    leaf_map: &BTreeMap<String, usize>,
) -> (ReferenceSet, Vec<QueryRecord>) {
    let mut refs = ReferenceSet::new();
    let mut queries = Vec::new();
    for (name, seq) in aln {
        if leaf_map.contains_key(&name) {
            refs.insert(name, seq);
        } else {
            queries.push(QueryRecord::new(name, seq));
        }
    }
    (refs, queries)
}

/// References and queries for a run.
///
/// Without `query_file`, `alignment` holds both and sequences named after a
/// backbone leaf are the references. With it, queries come from `query_file`
/// and other sequences of `alignment` are dropped. Every backbone leaf needs a
/// reference sequence and all sequences must be aligned to the same columns.
pub fn load_sequences(
    alignment: &str,
    query_file: Option<&str>,
    leaf_map: &BTreeMap<String, usize>,
) -> anyhow::Result<(ReferenceSet, Vec<QueryRecord>)> {
    let (refs, mut queries) = split_by_leaves(read_alignment(alignment)?, leaf_map);

    if let Some(query_file) = query_file {
        if !queries.is_empty() {
            tracing::warn!(
                "{} sequences of {} are not backbone leaves and are ignored",
                queries.len(),
                alignment
            );
        }
        queries = read_alignment(query_file)?
            .into_iter()
            .map(|(name, seq)| QueryRecord::new(name, seq))
            .collect();
    }

    let missing: Vec<&String> = leaf_map
        .keys()
        .filter(|label| !refs.contains_key(*label))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "{} backbone leaves have no sequence in {}: {}",
            missing.len(),
            alignment,
            missing.iter().take(5).join(", ")
        );
    }
    check_lengths(&refs, &queries)?;

    tracing::info!("{} references, {} queries", refs.len(), queries.len());
    Ok((refs, queries))
}

/// All sequences must share the column count of the first one.
pub fn check_lengths(refs: &ReferenceSet, queries: &[QueryRecord]) -> anyhow::Result<()> {
    let mut expected = None;
    let all = refs
        .iter()
        .map(|(n, s)| (n.as_str(), s.len()))
        .chain(queries.iter().map(|q| (q.name.as_str(), q.seq.len())));

    for (name, len) in all {
        match expected {
            None => expected = Some(len),
            Some(e) if e != len => {
                anyhow::bail!(
                    "Sequence {} has {} columns, expected {} as in the rest of the alignment",
                    name,
                    len,
                    e
                );
            }
            _ => {}
        }
    }
    Ok(())
}

/// Write records on single lines.
pub fn write_alignment<'a, I>(outfile: &str, records: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let writer = crate::writer(outfile)?;
    let mut fa_out = noodles_fasta::io::writer::Builder::default()
        .set_line_base_count(usize::MAX)
        .build_from_writer(writer);

    for (name, seq) in records {
        let definition = noodles_fasta::record::Definition::new(name, None);
        let sequence = noodles_fasta::record::Sequence::from(seq.to_vec());
        let record = noodles_fasta::Record::new(definition, sequence);
        fa_out.write_record(&record)?;
    }

    Ok(())
}
