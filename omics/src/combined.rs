use super::*;
use regex::Regex;

#[derive(Clone, Debug, PartialEq)]
/// One gene with both its transcript and protein measurements
pub struct CombinedRecord {
    /// Authoritative name from the cross-reference index; the row key
    pub gene_name: String,
    pub accession: String,
    pub rna: GeneRecord,
    pub protein: GeneRecord,
}

/// Output of [`link`]: one record per linked accession, in ascending
/// accession order
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedTable {
    pub rna_layout: Layout,
    pub protein_layout: Layout,
    pub records: Vec<CombinedRecord>,
    pub report: LinkReport,
}

/// Which cells of one side survive into the combined table
fn side_columns(layout: &Layout, config: &LinkConfig, unnamed: &Regex) -> Vec<(usize, String)> {
    let replicates = layout.replicate_columns().collect::<HashSet<&str>>();
    layout
        .columns()
        .into_iter()
        .enumerate()
        .filter(|(_, name)| {
            // Accession is shared, and the per-side names are superseded by
            // the index gene name
            name != ACCESSION
                && name != GENE_NAME
                && !unnamed.is_match(name)
                && !(config.drop_replicates && replicates.contains(name.as_str()))
        })
        .collect()
}

impl CombinedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lay the combined records out as a [`Table`]: gene name, accession,
    /// then the RNA and protein columns under their prefixes. Disposable
    /// columns are dropped before renaming and reordering.
    pub fn to_table(&self, config: &LinkConfig) -> Result<Table> {
        let unnamed = Regex::new(&config.unnamed_pattern)?;
        let rna_cols = side_columns(&self.rna_layout, config, &unnamed);
        let protein_cols = side_columns(&self.protein_layout, config, &unnamed);

        let mut columns = vec![GENE_NAME.to_string(), ACCESSION.to_string()];
        columns.extend(
            rna_cols
                .iter()
                .map(|(_, name)| format!("{}{}", config.rna_prefix, name)),
        );
        columns.extend(
            protein_cols
                .iter()
                .map(|(_, name)| format!("{}{}", config.protein_prefix, name)),
        );

        let rows = self
            .records
            .iter()
            .map(|rec| {
                let rna = rec.rna.row(&self.rna_layout);
                let protein = rec.protein.row(&self.protein_layout);
                let mut row = vec![
                    Value::from(rec.gene_name.as_str()),
                    Value::from(rec.accession.as_str()),
                ];
                row.extend(rna_cols.iter().map(|(i, _)| rna[*i].clone()));
                row.extend(protein_cols.iter().map(|(i, _)| protein[*i].clone()));
                row
            })
            .collect();

        let table = Table::new(columns, rows)?
            .drop_columns(|c| config.drop.iter().any(|d| d == c))
            .rename(&config.rename)?;
        let table = if config.output_order.is_empty() {
            table
        } else {
            table.select(&config.output_order)?
        };

        table.require(config.key_column())?;
        Ok(table)
    }
}
