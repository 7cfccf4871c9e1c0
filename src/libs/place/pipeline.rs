use super::assembler::{first_placement, Assembler};
use super::backbone::Backbone;
use super::context::RunContext;
use super::engine::{EngineJob, PlacementEngine};
use super::error::{PlaceError, Stage};
use super::extract::{extract, Subtree, SubtreeKind};
use super::jplace::PlacementRecord;
use super::mapper::{map_placements, EngineTree};
use crate::libs::fasta::{write_alignment, QueryRecord, ReferenceSet};
use crate::libs::hamming;

#[derive(Debug, Clone, Copy)]
pub struct PlaceOptions {
    pub kind: SubtreeKind,
    /// Number of leaves in each subtree
    pub size: usize,
    /// Ignore gap columns of the query when comparing sequences
    pub fragment: bool,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            kind: SubtreeKind::Edges,
            size: 2000,
            fragment: false,
        }
    }
}

/// Names and backbone placements of one query.
pub type Placed = (Vec<String>, Vec<PlacementRecord>);

/// Places queries one at a time on subtrees of the backbone.
pub struct Pipeline<'a, E: PlacementEngine> {
    backbone: &'a Backbone,
    refs: &'a ReferenceSet,
    engine: &'a E,
    ctx: &'a RunContext,
    opts: PlaceOptions,
}

impl<'a, E: PlacementEngine> Pipeline<'a, E> {
    pub fn new(
        backbone: &'a Backbone,
        refs: &'a ReferenceSet,
        engine: &'a E,
        ctx: &'a RunContext,
        opts: PlaceOptions,
    ) -> Self {
        Self {
            backbone,
            refs,
            engine,
            ctx,
            opts,
        }
    }

    /// Place every query. Queries the engine fails on are skipped.
    pub fn run(&self, queries: &[QueryRecord], asm: &mut Assembler) -> Result<(), PlaceError> {
        for (i, query) in queries.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, queries.len(), query.name);
            match self.place_query(i, query)? {
                Some((names, records)) => asm.add(&query.name, names, &records),
                None => asm.skip(&query.name),
            }
        }
        Ok(())
    }

    /// `None` when the engine found no placement or failed on this query.
    /// `index` is the query's position in the input.
    pub fn place_query(
        &self,
        index: usize,
        query: &QueryRecord,
    ) -> Result<Option<Placed>, PlaceError> {
        let name = query.name.as_str();

        // Anchor search
        let k = match self.opts.kind {
            SubtreeKind::Hamming => self.opts.size,
            _ => 1,
        };
        let hits = hamming::closest(&query.seq, self.refs, k, self.opts.fragment);
        let (anchor, dist) = hits
            .first()
            .ok_or_else(|| PlaceError::NoReferences.at(Stage::AnchorSearch, name))?;
        tracing::debug!("{}: closest reference {} at distance {}", name, anchor, dist);
        let closest: Vec<String> = hits.iter().map(|(label, _)| label.clone()).collect();

        // Extraction
        let subtree = extract(self.backbone, self.opts.kind, self.opts.size, &closest)
            .map_err(|e| e.at(Stage::Extraction, name))?;
        let job = self.ctx.job(index, name);
        self.write_inputs(&subtree, query, &job)
            .map_err(|e| e.at(Stage::Extraction, name))?;

        // Engine
        let doc = match self.engine.place(&job) {
            Ok(doc) => doc,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}: placement failed: {}", name, e);
                self.ctx.clean(&job);
                return Ok(None);
            }
            Err(e) => return Err(PlaceError::from(e).at(Stage::EngineInvocation, name)),
        };

        // Coordinate mapping
        let placed = match first_placement(&doc) {
            None => None,
            Some(placement) => {
                let mapped = EngineTree::parse(&doc.tree)
                    .and_then(|local| {
                        let records = placement.records(&doc.fields)?;
                        map_placements(self.backbone, &local, &records)
                    })
                    .map_err(|e| e.at(Stage::CoordinateMapping, name))?;
                Some((placement.names(), mapped))
            }
        };

        self.ctx.clean(&job);
        Ok(placed)
    }

    // Subtree, references alone and references plus the query. References
    // are named `label%%token` in all three.
    fn write_inputs(
        &self,
        subtree: &Subtree,
        query: &QueryRecord,
        job: &EngineJob,
    ) -> Result<(), PlaceError> {
        std::fs::write(&job.tree_file, format!("{}\n", subtree.to_newick()))?;

        let mut records: Vec<(String, &[u8])> = vec![];
        for (plain, encoded) in subtree.leaf_names() {
            let seq = self
                .refs
                .get(&plain)
                .ok_or_else(|| PlaceError::Other(format!("no sequence for reference {}", plain)))?;
            records.push((encoded, seq.as_slice()));
        }

        write_alignment(
            &job.ref_aln_file.to_string_lossy(),
            records.iter().map(|(n, s)| (n.as_str(), *s)),
        )?;
        write_alignment(
            &job.aln_file.to_string_lossy(),
            records
                .iter()
                .map(|(n, s)| (n.as_str(), *s))
                .chain(std::iter::once((query.name.as_str(), query.seq.as_slice()))),
        )?;

        Ok(())
    }
}
