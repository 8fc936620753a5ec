//! Turn a raw [`Table`] into a [`CleanedTable`] of typed [`GeneRecord`]s
use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Column positions in the raw table, resolved once
struct Schema {
    annotation: usize,
    external_id: Option<usize>,
    passthrough: Vec<usize>,
    replicates: Vec<Vec<usize>>,
}

fn resolve_schema(table: &Table, config: &TableConfig) -> Result<Schema> {
    let annotation = table.require(&config.annotation_column)?;
    let external_id = match &config.external_id_column {
        Some(name) => Some(table.require(name)?),
        None => None,
    };

    let mut names = HashSet::new();
    let mut replicates = Vec::new();
    for cond in &config.conditions {
        if !names.insert(cond.name.as_str()) {
            return Err(Error::Schema(format!("duplicate condition '{}'", cond.name)));
        }
        if cond.replicates.is_empty() {
            return Err(Error::Schema(format!(
                "condition '{}' has no replicate columns",
                cond.name
            )));
        }
        replicates.push(
            cond.replicates
                .iter()
                .map(|r| table.require(r))
                .collect::<Result<Vec<usize>>>()?,
        );
    }

    let numeric = replicates.iter().flatten().copied().collect::<HashSet<usize>>();
    let passthrough = (0..table.columns.len())
        .filter(|idx| !numeric.contains(idx) && Some(*idx) != external_id)
        .collect();

    Ok(Schema {
        annotation,
        external_id,
        passthrough,
        replicates,
    })
}

fn resolve_comparisons(config: &TableConfig) -> Result<Vec<(usize, usize)>> {
    let position = |name: &str| {
        config
            .conditions
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::Schema(format!("comparison names unknown condition '{}'", name)))
    };

    if config.comparisons.is_empty() {
        let n = config.conditions.len();
        Ok((0..n)
            .flat_map(|a| (0..n).map(move |b| (a, b)))
            .filter(|(a, b)| a != b)
            .collect())
    } else {
        config
            .comparisons
            .iter()
            .map(|(a, b)| Ok((position(a.as_str())?, position(b.as_str())?)))
            .collect()
    }
}

/// Keep `min(rows, n)` rows chosen uniformly without replacement, in their
/// original order
fn subsample(rows: Vec<Vec<Value>>, n: usize, seed: Option<u64>) -> Vec<Vec<Value>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let amount = n.min(rows.len());
    let mut keep = vec![false; rows.len()];
    for idx in rand::seq::index::sample(&mut rng, rows.len(), amount).into_iter() {
        keep[idx] = true;
    }
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, k)| if k { Some(row) } else { None })
        .collect()
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Missing => None,
        v => Some(v.to_string()),
    }
}

fn read_record(
    row: &[Value],
    rowno: usize,
    schema: &Schema,
    columns: &[String],
    comparisons: &[(usize, usize)],
) -> Result<GeneRecord> {
    let mut replicates = Vec::with_capacity(schema.replicates.len());
    let mut means = Vec::with_capacity(schema.replicates.len());
    let mut stdevs = Vec::with_capacity(schema.replicates.len());

    for group in &schema.replicates {
        let mut cells = Vec::with_capacity(group.len());
        let mut present = Vec::with_capacity(group.len());
        for &idx in group {
            match row[idx].number() {
                Ok(Some(x)) => {
                    present.push(x);
                    cells.push(Value::Num(x));
                }
                Ok(None) => cells.push(Value::Missing),
                Err(s) => {
                    return Err(Error::Schema(format!(
                        "non-numeric value '{}' in replicate column '{}' (row {})",
                        s, columns[idx], rowno
                    )))
                }
            }
        }
        means.push(stats::mean(&present));
        stdevs.push(stats::stddev(&present));
        replicates.push(cells);
    }

    let fold_changes = comparisons
        .iter()
        .map(|&(a, b)| stats::log2fc(means[a], means[b]))
        .collect();

    let (accession, gene_name) = match cell_text(&row[schema.annotation]) {
        Some(ann) => (identity::accession(&ann), identity::gene_name(&ann)),
        None => (MISSING.to_string(), MISSING.to_string()),
    };

    Ok(GeneRecord {
        accession,
        gene_name,
        external_id: schema.external_id.and_then(|idx| cell_text(&row[idx])),
        passthrough: schema.passthrough.iter().map(|&i| row[i].clone()).collect(),
        replicates,
        means,
        stdevs,
        fold_changes,
        search_hit: None,
    })
}

/// Clean a raw measurement table
///
/// Redundant columns are dropped and the rest renamed, then every row is
/// turned into a [`GeneRecord`]: replicate means and sample standard
/// deviations, pairwise log2 fold changes, and accession and gene name taken
/// from the annotation column. Repeated gene names are suffixed so that
/// every name in the returned table is unique.
pub fn clean(table: Table, config: &TableConfig) -> Result<CleanedTable> {
    for name in config.drop.iter().filter(|d| table.column(d).is_none()) {
        debug!("column '{}' marked redundant but not present", name);
    }
    let table = table
        .drop_columns(|c| config.drop.iter().any(|d| d == c))
        .rename(&config.rename)?;

    let schema = resolve_schema(&table, config)?;
    let comparisons = resolve_comparisons(config)?;

    let layout = Layout {
        passthrough: schema
            .passthrough
            .iter()
            .map(|&i| table.columns[i].clone())
            .collect(),
        conditions: config.conditions.clone(),
        comparisons,
        has_external_id: schema.external_id.is_some(),
        searched: false,
    };

    // Derived columns, including the flag a later search adds, must not
    // shadow a pass-through column
    let mut seen = HashSet::new();
    let reserved = std::iter::once(SEARCH_HIT.to_string());
    for c in layout.columns().into_iter().chain(reserved) {
        if !seen.insert(c.clone()) {
            return Err(Error::Schema(format!("column '{}' would be duplicated", c)));
        }
    }

    let Table { columns, mut rows } = table;
    let total = rows.len();

    if config.drop_unannotated {
        rows.retain(|row| !row[schema.annotation].is_missing());
        if rows.len() < total {
            debug!("dropped {} unannotated rows", total - rows.len());
        }
    }

    if let Some(n) = config.sample {
        rows = subsample(rows, n, config.seed);
        info!("subsampled {} of {} rows", rows.len(), total);
    }

    let mut records = rows
        .par_iter()
        .enumerate()
        .map(|(rowno, row)| read_record(row, rowno, &schema, &columns, &layout.comparisons))
        .collect::<Result<Vec<GeneRecord>>>()?;

    let names = identity::deduplicate(records.iter().map(|r| r.gene_name.clone()));
    let mut renamed = 0;
    for (record, name) in records.iter_mut().zip(names) {
        if record.gene_name != name {
            renamed += 1;
            record.gene_name = name;
        }
    }
    if renamed > 0 {
        debug!("suffixed {} duplicate gene names", renamed);
    }

    let unnamed = records.iter().filter(|r| r.accession == MISSING).count();
    info!(
        "cleaned {} rows: {} conditions, {} without accession",
        records.len(),
        layout.conditions.len(),
        unnamed
    );

    let cleaned = CleanedTable {
        layout,
        records,
        output_order: config.output_order.clone(),
    };

    // Fail now, not at write time, on an unknown output column
    for name in &cleaned.output_order {
        if cleaned.layout.resolve(name).is_none() && name != SEARCH_HIT {
            return Err(Error::Schema(format!(
                "output column '{}' does not exist",
                name
            )));
        }
    }
    Ok(cleaned)
}
