use super::backbone::Backbone;
use super::jplace::{JplaceDocument, Placement, PlacementRecord};

/// The first placement entry of an engine document that has any rows.
pub fn first_placement(doc: &JplaceDocument) -> Option<&Placement> {
    doc.placements.iter().find(|p| !p.p.is_empty())
}

/// Collects mapped placements into one jplace document on the backbone.
pub struct Assembler {
    doc: JplaceDocument,
    skipped: Vec<String>,
}

impl Assembler {
    pub fn new(backbone: &Backbone, invocation: &str) -> Self {
        Self {
            doc: JplaceDocument::new(backbone.jplace_tree(), invocation),
            skipped: vec![],
        }
    }

    /// Add the mapped rows of one query. No rows means no placement.
    pub fn add(&mut self, query: &str, names: Vec<String>, records: &[PlacementRecord]) {
        if records.is_empty() {
            self.skip(query);
            return;
        }

        let names = if names.is_empty() {
            vec![query.to_string()]
        } else {
            names
        };
        self.doc.placements.push(Placement {
            p: records.iter().map(PlacementRecord::to_row).collect(),
            n: Some(names),
            nm: None,
        });
    }

    /// Record a query that produced no placement.
    pub fn skip(&mut self, query: &str) {
        tracing::info!("{}: no placement", query);
        self.skipped.push(query.to_string());
    }

    pub fn placed(&self) -> usize {
        self.doc.placements.len()
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn finish(self) -> JplaceDocument {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::Tree;

    fn record(edge_num: usize) -> PlacementRecord {
        PlacementRecord {
            distal_length: 0.1,
            edge_num,
            like_weight_ratio: 1.0,
            likelihood: -10.0,
            pendant_length: 0.2,
        }
    }

    #[test]
    fn test_assembler() {
        let backbone = Backbone::new(Tree::from_newick("(A:1,B:1,C:1);").unwrap()).unwrap();
        let mut asm = Assembler::new(&backbone, "subplace place");

        asm.add("Q1", vec![], &[]);
        asm.add("Q2", vec![], &[record(1), record(2)]);
        asm.add("Q3", vec!["Q3".to_string(), "Q3b".to_string()], &[record(0)]);

        assert_eq!(asm.placed(), 2);
        assert_eq!(asm.skipped(), ["Q1".to_string()]);

        let doc = asm.finish();
        assert_eq!(doc.tree, "(A:1{0},B:1{1},C:1{2}){3};");
        assert_eq!(doc.version, 3);
        assert_eq!(doc.metadata["invocation"], "subplace place");
        assert_eq!(doc.placements[0].names(), vec!["Q2"]);
        assert_eq!(doc.placements[0].p.len(), 2);
        assert_eq!(doc.placements[1].names(), vec!["Q3", "Q3b"]);

        let recs = doc.placements[0].records(&doc.fields).unwrap();
        assert_eq!(recs[1], record(2));
    }

    #[test]
    fn test_first_placement() {
        let text = r#"{"tree": "(A{0},B{1},C{2}){3};",
            "placements": [{"p": [], "n": ["Q1"]}, {"p": [[0.1, 1, 1.0, -1.0, 0.1]], "n": ["Q1"]}],
            "fields": ["distal_length", "edge_num", "like_weight_ratio", "likelihood", "pendant_length"],
            "version": 3}"#;
        let doc = JplaceDocument::parse(text).unwrap();
        assert_eq!(first_placement(&doc).unwrap().p.len(), 1);

        let empty = r#"{"tree": "(A{0},B{1},C{2}){3};", "placements": [],
            "fields": ["distal_length", "edge_num", "like_weight_ratio", "likelihood", "pendant_length"],
            "version": 3}"#;
        let doc = JplaceDocument::parse(empty).unwrap();
        assert!(first_placement(&doc).is_none());
    }
}
