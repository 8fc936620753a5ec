//! Join the cleaned RNA and protein tables through the cross-reference index
use super::*;
use uniprot::Index;

/// Why rows fell out of the join, for the unresolved-accession log
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkReport {
    /// Protein-side external IDs with no entry in the index
    pub unresolved_external_ids: Vec<String>,
    /// RNA-side accessions with no gene name in the index
    pub unresolved_accessions: Vec<String>,
    /// Accessions seen more than once on the RNA side, which cannot be linked
    pub ambiguous_accessions: Vec<String>,
    /// Resolved protein accessions that have no RNA partner
    pub protein_only: Vec<String>,
}

impl LinkReport {
    pub fn write<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "reason\tidentifier")?;
        let sections = [
            ("unresolved_external_id", &self.unresolved_external_ids),
            ("unresolved_accession", &self.unresolved_accessions),
            ("ambiguous_accession", &self.ambiguous_accessions),
            ("protein_only", &self.protein_only),
        ];
        for (reason, ids) in sections.iter() {
            for id in ids.iter() {
                writeln!(w, "{}\t{}", reason, id)?;
            }
        }
        Ok(())
    }
}

/// Protein rows whose external ID resolves, paired with the resolved accession
fn resolve_proteins<'a>(
    protein: &'a CleanedTable,
    index: &'a Index,
    report: &mut LinkReport,
) -> Vec<(&'a str, &'a GeneRecord)> {
    let mut resolved = Vec::new();
    for record in &protein.records {
        let ext = match record.external_id.as_deref() {
            Some(ext) => ext,
            None => continue,
        };
        match index.accession_of(ext) {
            Some(acc) => resolved.push((acc, record)),
            None => report.unresolved_external_ids.push(ext.to_string()),
        }
    }
    resolved
}

/// RNA rows paired with the accession they join on
fn rna_keys<'a>(
    rna: &'a CleanedTable,
    index: &'a Index,
    config: &LinkConfig,
) -> Vec<(&'a str, &'a GeneRecord)> {
    rna.records
        .iter()
        .map(|record| {
            let acc = record.accession.as_str();
            let key = if config.match_unversioned {
                index.canonical_accession(acc).unwrap_or(acc)
            } else {
                acc
            };
            (key, record)
        })
        .collect()
}

/// Check that both sides line up row for row before they are zipped
fn check_alignment(
    rna: &[(&str, &GeneRecord)],
    protein: &[(&str, &GeneRecord)],
) -> Result<()> {
    if rna.len() != protein.len() {
        return Err(Error::LinkageIntegrity(format!(
            "{} RNA rows but {} protein rows share a linkable accession",
            rna.len(),
            protein.len()
        )));
    }
    for (idx, (r, p)) in rna.iter().zip(protein).enumerate() {
        if r.0 != p.0 {
            return Err(Error::LinkageIntegrity(format!(
                "row {} is misaligned: RNA accession '{}' vs protein accession '{}'",
                idx, r.0, p.0
            )));
        }
        if idx > 0 && rna[idx - 1].0 >= r.0 {
            return Err(Error::LinkageIntegrity(format!(
                "accession '{}' is not strictly ascending",
                r.0
            )));
        }
    }
    Ok(())
}

/// Link the cleaned RNA and protein tables through `index`
///
/// Protein rows are resolved to accessions by external ID; an accession is
/// linked when it has a gene name in the index, appears at least once among
/// the resolved protein rows and exactly once in the RNA table. Accessions
/// that are ambiguous on the RNA side are excluded rather than guessed.
/// Matched rows are sorted by accession and zipped, and each combined record
/// takes its gene name from the index.
pub fn link(
    rna: &CleanedTable,
    protein: &CleanedTable,
    index: &Index,
    config: &LinkConfig,
) -> Result<CombinedTable> {
    let mut report = LinkReport::default();

    let proteins = resolve_proteins(protein, index, &mut report);
    let rnas = rna_keys(rna, index, config);

    let mut rna_counts: HashMap<&str, usize> = HashMap::new();
    for (acc, _) in &rnas {
        *rna_counts.entry(*acc).or_insert(0) += 1;
    }
    let protein_accs = proteins.iter().map(|(acc, _)| *acc).collect::<HashSet<&str>>();

    let mut linked: HashSet<&str> = HashSet::new();
    for (&acc, &count) in &rna_counts {
        if acc == MISSING {
            continue;
        }
        if !index.contains_accession(acc) {
            report.unresolved_accessions.push(acc.to_string());
            continue;
        }
        if count > 1 {
            report.ambiguous_accessions.push(acc.to_string());
            continue;
        }
        if protein_accs.contains(acc) {
            linked.insert(acc);
        }
    }
    report.protein_only = protein_accs
        .iter()
        .filter(|acc| !rna_counts.contains_key(*acc))
        .map(|acc| acc.to_string())
        .collect();

    report.unresolved_accessions.sort();
    report.ambiguous_accessions.sort();
    report.protein_only.sort();

    let mut rna_rows = rnas
        .into_iter()
        .filter(|(acc, _)| linked.contains(acc))
        .collect::<Vec<_>>();
    let mut protein_rows = proteins
        .into_iter()
        .filter(|(acc, _)| linked.contains(acc))
        .collect::<Vec<_>>();

    // Stable sorts, so ties keep their original row order
    rna_rows.sort_by(|a, b| a.0.cmp(b.0));
    protein_rows.sort_by(|a, b| a.0.cmp(b.0));

    check_alignment(&rna_rows, &protein_rows)?;

    let mut records = Vec::with_capacity(rna_rows.len());
    let mut names = HashSet::new();
    for ((acc, r), (_, p)) in rna_rows.into_iter().zip(protein_rows) {
        let gene_name = index.resolve_gene_name(acc)?.to_string();
        if !names.insert(gene_name.clone()) {
            return Err(Error::LinkageIntegrity(format!(
                "gene name '{}' names more than one linked accession",
                gene_name
            )));
        }
        records.push(CombinedRecord {
            gene_name,
            accession: acc.to_string(),
            rna: r.clone(),
            protein: p.clone(),
        });
    }

    if !report.ambiguous_accessions.is_empty() {
        warn!(
            "{} accessions occur more than once in the RNA table and were not linked",
            report.ambiguous_accessions.len()
        );
    }
    info!(
        "linked {} accessions ({} protein IDs unresolved, {} RNA accessions unresolved, {} protein-only)",
        records.len(),
        report.unresolved_external_ids.len(),
        report.unresolved_accessions.len(),
        report.protein_only.len()
    );

    Ok(CombinedTable {
        rna_layout: rna.layout.clone(),
        protein_layout: protein.layout.clone(),
        records,
        report,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use uniprot::{DuplicatePolicy, Entry};

    macro_rules! rec {
        ($acc:expr, $name:expr, $ext:expr, $mean:expr) => {
            GeneRecord {
                accession: String::from($acc),
                gene_name: String::from($name),
                external_id: $ext.map(String::from),
                passthrough: Vec::new(),
                replicates: vec![vec![Value::Num($mean)]],
                means: vec![$mean],
                stdevs: vec![f64::NAN],
                fold_changes: Vec::new(),
                search_hit: None,
            }
        };
    }

    fn layout(ext: bool) -> Layout {
        Layout {
            conditions: vec![Condition {
                name: String::from("wt"),
                replicates: vec![String::from("wt_1")],
            }],
            has_external_id: ext,
            ..Layout::default()
        }
    }

    fn cleaned(ext: bool, records: Vec<GeneRecord>) -> CleanedTable {
        CleanedTable {
            layout: layout(ext),
            records,
            output_order: Vec::new(),
        }
    }

    fn index() -> Index {
        Index::build(
            vec![
                Entry::new("P1", "NP_1.1", "ATG1"),
                Entry::new("P2", "NP_2.1", "ATG2"),
                Entry::new("P3", "NP_3.1", "ATG3"),
                Entry::new("P4", "NP_4.1", "ATG4"),
                Entry::new("P5", "NP_5", "ATG5"),
            ],
            DuplicatePolicy::default(),
        )
        .unwrap()
    }

    fn rna() -> CleanedTable {
        let none: Option<&str> = None;
        cleaned(
            false,
            vec![
                rec!("NP_3.1", "atg3", none, 3.0),
                rec!("NP_2.1", "atg2", none, 2.0),
                rec!("NP_2.1", "atg2 (1)", none, 2.5),
                rec!("NP_1.1", "atg1", none, 1.0),
                rec!("NP_9.1", "other", none, 9.0),
                rec!("NaN", "NaN", none, 0.0),
                rec!("NP_5.2", "atg5", none, 5.0),
            ],
        )
    }

    fn protein() -> CleanedTable {
        cleaned(
            true,
            vec![
                rec!("NaN", "Atg1p", Some("P1"), 10.0),
                rec!("NaN", "Atg2p", Some("P2"), 20.0),
                rec!("NaN", "Atg3p", Some("P3"), 30.0),
                rec!("NaN", "Atg4p", Some("P4"), 40.0),
                rec!("NaN", "Atg5p", Some("P5"), 50.0),
                rec!("NaN", "Xp", Some("P99"), 0.0),
                rec!("NaN", "Yp", None::<&str>, 0.0),
            ],
        )
    }

    #[test]
    fn link_resolved_accessions() {
        let combined = link(&rna(), &protein(), &index(), &LinkConfig::default()).unwrap();

        let accs = combined
            .records
            .iter()
            .map(|r| r.accession.as_str())
            .collect::<Vec<_>>();
        // NP_2.1 is ambiguous on the RNA side, NP_4.1 has no RNA row, and
        // NP_5.2 only matches the index without its version
        assert_eq!(accs, vec!["NP_1.1", "NP_3.1"]);

        let first = &combined.records[0];
        assert_eq!(first.gene_name, "ATG1");
        assert_eq!(first.rna.means, vec![1.0]);
        assert_eq!(first.protein.means, vec![10.0]);

        let report = &combined.report;
        assert_eq!(report.unresolved_external_ids, vec!["P99"]);
        assert_eq!(report.ambiguous_accessions, vec!["NP_2.1"]);
        assert_eq!(report.unresolved_accessions, vec!["NP_5.2", "NP_9.1"]);
        assert_eq!(report.protein_only, vec!["NP_4.1", "NP_5"]);
    }

    #[test]
    fn link_unversioned() {
        let config = LinkConfig {
            match_unversioned: true,
            ..LinkConfig::default()
        };
        let combined = link(&rna(), &protein(), &index(), &config).unwrap();
        let names = combined
            .records
            .iter()
            .map(|r| r.gene_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["ATG1", "ATG3", "ATG5"]);
        assert_eq!(combined.records[2].rna.accession, "NP_5.2");
    }

    #[test]
    fn idempotent() {
        let a = link(&rna(), &protein(), &index(), &LinkConfig::default()).unwrap();
        let b = link(&rna(), &protein(), &index(), &LinkConfig::default()).unwrap();
        assert_eq!(a.to_table(&LinkConfig::default()).unwrap(), b.to_table(&LinkConfig::default()).unwrap());
    }

    #[test]
    fn duplicate_protein_accession() {
        let mut protein = protein();
        protein.records.push(rec!("NaN", "Atg1p", Some("P1"), 11.0));
        assert!(matches!(
            link(&rna(), &protein, &index(), &LinkConfig::default()),
            Err(Error::LinkageIntegrity(_))
        ));
    }

    #[test]
    fn duplicate_gene_name() {
        let index = Index::build(
            vec![
                Entry::new("P1", "NP_1.1", "ATG1"),
                Entry::new("P3", "NP_3.1", "ATG1"),
            ],
            DuplicatePolicy::default(),
        )
        .unwrap();
        assert!(matches!(
            link(&rna(), &protein(), &index, &LinkConfig::default()),
            Err(Error::LinkageIntegrity(_))
        ));
    }

    #[test]
    fn report() {
        let combined = link(&rna(), &protein(), &index(), &LinkConfig::default()).unwrap();
        let mut out = Vec::new();
        combined.report.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("reason\tidentifier\n"));
        assert!(text.contains("ambiguous_accession\tNP_2.1\n"));
        assert!(text.contains("unresolved_external_id\tP99\n"));
    }
}
