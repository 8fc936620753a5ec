use super::*;

pub const ACCESSION: &str = "accession";
pub const GENE_NAME: &str = "gene_name";
pub const EXTERNAL_ID: &str = "external_id";
pub const SEARCH_HIT: &str = "search_hit";

#[derive(Clone, Debug, PartialEq)]
/// One gene (RNA side) or protein (SILAC side) after cleaning
pub struct GeneRecord {
    /// Extracted accession, or [`MISSING`]
    pub accession: String,
    /// Extracted and deduplicated gene name, or [`MISSING`] (possibly suffixed)
    pub gene_name: String,
    pub external_id: Option<String>,
    /// Pass-through cells, aligned with [`Layout::passthrough`]
    pub passthrough: Vec<Value>,
    /// Replicate measurements per condition; each cell is a number or missing
    pub replicates: Vec<Vec<Value>>,
    pub means: Vec<f64>,
    pub stdevs: Vec<f64>,
    /// Aligned with [`Layout::comparisons`]
    pub fold_changes: Vec<f64>,
    pub search_hit: Option<bool>,
}

/// A column resolved against a [`Layout`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnRef {
    Accession,
    GeneName,
    ExternalId,
    Passthrough(usize),
    /// Replicate, mean, stdev, fold change or search flag. Never text.
    Numeric,
}

/// Column layout shared by every record of a [`CleanedTable`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub passthrough: Vec<String>,
    pub conditions: Vec<Condition>,
    /// Ordered (A, B) condition index pairs
    pub comparisons: Vec<(usize, usize)>,
    pub has_external_id: bool,
    pub searched: bool,
}

impl Layout {
    pub fn mean_column(&self, cond: usize) -> String {
        format!("{}_mean", self.conditions[cond].name)
    }

    pub fn stdev_column(&self, cond: usize) -> String {
        format!("{}_stdev", self.conditions[cond].name)
    }

    pub fn fold_change_column(&self, cmp: usize) -> String {
        let (a, b) = self.comparisons[cmp];
        format!(
            "log2fc_{}_{}",
            self.conditions[a].name, self.conditions[b].name
        )
    }

    /// Every raw replicate column name
    pub fn replicate_columns(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .flat_map(|c| c.replicates.iter().map(|s| s.as_str()))
    }

    /// Column names in canonical order
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![ACCESSION.to_string(), GENE_NAME.to_string()];
        if self.has_external_id {
            columns.push(EXTERNAL_ID.into());
        }
        columns.extend(self.passthrough.iter().cloned());
        for (idx, cond) in self.conditions.iter().enumerate() {
            columns.extend(cond.replicates.iter().cloned());
            columns.push(self.mean_column(idx));
            columns.push(self.stdev_column(idx));
        }
        columns.extend((0..self.comparisons.len()).map(|i| self.fold_change_column(i)));
        if self.searched {
            columns.push(SEARCH_HIT.into());
        }
        columns
    }

    pub fn resolve(&self, name: &str) -> Option<ColumnRef> {
        match name {
            ACCESSION => return Some(ColumnRef::Accession),
            GENE_NAME => return Some(ColumnRef::GeneName),
            EXTERNAL_ID if self.has_external_id => return Some(ColumnRef::ExternalId),
            _ => {}
        }
        if let Some(idx) = self.passthrough.iter().position(|c| c == name) {
            return Some(ColumnRef::Passthrough(idx));
        }
        if self.columns().iter().any(|c| c == name) {
            return Some(ColumnRef::Numeric);
        }
        None
    }

    /// Every column that can hold text
    pub fn text_columns(&self) -> Vec<ColumnRef> {
        let mut refs = vec![ColumnRef::Accession, ColumnRef::GeneName];
        if self.has_external_id {
            refs.push(ColumnRef::ExternalId);
        }
        refs.extend((0..self.passthrough.len()).map(ColumnRef::Passthrough));
        refs
    }
}

impl GeneRecord {
    /// Text held in a column, if that column is text-typed for this record
    pub fn text(&self, col: ColumnRef) -> Option<&str> {
        match col {
            ColumnRef::Accession => Some(&self.accession),
            ColumnRef::GeneName => Some(&self.gene_name),
            ColumnRef::ExternalId => self.external_id.as_deref(),
            // Numeric cells are measurements, not searchable text
            ColumnRef::Passthrough(idx) => self
                .passthrough
                .get(idx)?
                .as_text()
                .filter(|s| s.parse::<f64>().is_err()),
            ColumnRef::Numeric => None,
        }
    }

    /// Cells in [`Layout::columns`] order
    pub fn row(&self, layout: &Layout) -> Vec<Value> {
        let mut row: Vec<Value> = vec![
            self.accession.as_str().into(),
            self.gene_name.as_str().into(),
        ];
        if layout.has_external_id {
            row.push(
                self.external_id
                    .as_ref()
                    .map(|s| Value::from(s.as_str()))
                    .unwrap_or(Value::Missing),
            );
        }
        row.extend(self.passthrough.iter().cloned());
        for (idx, reps) in self.replicates.iter().enumerate() {
            row.extend(reps.iter().cloned());
            row.push(self.means[idx].into());
            row.push(self.stdevs[idx].into());
        }
        row.extend(self.fold_changes.iter().map(|&x| Value::from(x)));
        if layout.searched {
            row.push(
                self.search_hit
                    .map(Value::from)
                    .unwrap_or(Value::Missing),
            );
        }
        row
    }
}

/// A measurement table after cleaning: one typed record per row
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleanedTable {
    pub layout: Layout,
    pub records: Vec<GeneRecord>,
    /// Explicit output order, empty for canonical order
    pub output_order: Vec<String>,
}

impl CleanedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render as a [`Table`] in the configured output order
    pub fn to_table(&self) -> Result<Table> {
        let table = Table::new(
            self.layout.columns(),
            self.records.iter().map(|r| r.row(&self.layout)).collect(),
        )?;
        if self.output_order.is_empty() {
            Ok(table)
        } else {
            table.select(&self.output_order)
        }
    }
}
