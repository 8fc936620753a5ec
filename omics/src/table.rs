//! In-memory measurement tables, as read from and written to delimited files
use super::*;
use std::fmt;
use std::io::{Read, Write};

/// Sentinel written in place of missing values and unknown identities
pub const MISSING: &str = "NaN";

/// A single cell of a [`Table`]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Num(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Interpret a raw cell. Empty cells and the usual spellings of "not
    /// available" become [`Value::Missing`], never zero. Anything else is
    /// kept as trimmed text, so identifiers like `0042` survive untouched;
    /// measurement columns are read as numbers by [`Value::number`].
    pub fn parse(cell: &str) -> Value {
        let cell = cell.trim();
        match cell {
            "" | "NaN" | "nan" | "N/A" | "NA" => Value::Missing,
            _ => Value::Text(cell.into()),
        }
    }

    /// Read a measurement: `Ok(None)` when missing, `Err` holding the
    /// offending text when the cell is not a number
    pub fn number(&self) -> std::result::Result<Option<f64>, &str> {
        match self {
            Value::Num(x) if x.is_nan() => Ok(None),
            Value::Num(x) => Ok(Some(*x)),
            Value::Missing => Ok(None),
            Value::Text(s) => match s.parse::<f64>() {
                Ok(x) if x.is_nan() => Ok(None),
                Ok(x) => Ok(Some(x)),
                Err(_) => Err(s),
            },
        }
    }

    pub fn is_missing(&self) -> bool {
        *self == Value::Missing
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(x) => Some(*x),
            _ => None,
        }
    }

    /// Text cells only; numbers are not considered text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Value {
        if x.is_nan() {
            Value::Missing
        } else {
            Value::Num(x)
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Text(if b { "True" } else { "False" }.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(MISSING),
        }
    }
}

/// Ordered rows of named columns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Construct a table, checking that headers are unique and every row
    /// has one cell per column
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Table> {
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(Error::Schema(format!("duplicate column '{}'", c)));
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::Schema(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Table { columns, rows })
    }

    /// Read a delimited table with a header row
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns = rdr
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<String>>();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(Value::parse).collect::<Vec<Value>>());
        }
        Table::new(columns, rows)
    }

    pub fn load<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Table> {
        let table = Table::from_reader(fs::File::open(path.as_ref())?, delimiter)?;
        debug!(
            "read {} rows x {} columns from {}",
            table.len(),
            table.columns.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn write<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, delimiter: u8) -> Result<()> {
        let f = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())?;
        self.write(io::BufWriter::new(f), delimiter)?;
        info!("wrote {} rows to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact (case-sensitive) name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column that must be present
    pub fn require(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| Error::Schema(format!("required column '{}' is absent", name)))
    }

    /// Remove every column for which `pred` returns true
    pub fn drop_columns<F: Fn(&str) -> bool>(self, pred: F) -> Table {
        let keep = self
            .columns
            .iter()
            .map(|c| !pred(c))
            .collect::<Vec<bool>>();
        let columns = self
            .columns
            .into_iter()
            .zip(&keep)
            .filter_map(|(c, &k)| if k { Some(c) } else { None })
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter_map(|(v, &k)| if k { Some(v) } else { None })
                    .collect()
            })
            .collect();
        Table { columns, rows }
    }

    /// Rename columns according to `map`. Names not in the table are ignored;
    /// producing a duplicate column name is an error.
    pub fn rename(self, map: &BTreeMap<String, String>) -> Result<Table> {
        let columns = self
            .columns
            .into_iter()
            .map(|c| map.get(&c).cloned().unwrap_or(c))
            .collect();
        Table::new(columns, self.rows)
    }

    /// Reorder columns to exactly `order`. Every name must exist.
    pub fn select(self, order: &[String]) -> Result<Table> {
        let indices = order
            .iter()
            .map(|name| {
                self.column(name).ok_or_else(|| {
                    Error::Schema(format!("output column '{}' does not exist", name))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table::new(order.to_vec(), rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_values() {
        assert_eq!(Value::parse("1.5"), Value::Text("1.5".into()));
        assert_eq!(Value::parse(" 0042 "), Value::Text("0042".into()));
        assert_eq!(Value::parse("1.5").number(), Ok(Some(1.5)));
        assert_eq!(Value::parse("1e3").number(), Ok(Some(1000.0)));
        assert_eq!(Value::Missing.number(), Ok(None));
        assert_eq!(Value::parse("ATG8").number(), Err("ATG8"));
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse("NaN"), Value::Missing);
        assert_eq!(Value::parse("N/A"), Value::Missing);
        assert_eq!(Value::parse("ATG8"), Value::Text("ATG8".into()));
        assert_eq!(Value::from(f64::NAN), Value::Missing);
        assert_eq!(Value::Missing.to_string(), "NaN");
    }

    #[test]
    fn read_write() {
        let input = "id\tdesc\twt_1\n0042\tfoo bar\t1.10\nB\t\t2\n";
        let table = Table::from_reader(Cursor::new(input), b'\t').unwrap();
        assert_eq!(table.columns, vec!["id", "desc", "wt_1"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Value::Text("0042".into()));
        assert_eq!(table.rows[1][1], Value::Missing);
        assert_eq!(table.rows[1][2].number(), Ok(Some(2.0)));

        // Cells are written back exactly as read
        let mut out = Vec::new();
        table.write(&mut out, b'\t').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id\tdesc\twt_1\n0042\tfoo bar\t1.10\nB\tNaN\t2\n"
        );
    }

    #[test]
    fn duplicate_header() {
        let input = "a,a\n1,2\n";
        assert!(matches!(
            Table::from_reader(Cursor::new(input), b','),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn select_drop_rename() {
        let table = Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![Value::Num(1.), "x".into(), Value::Missing]],
        )
        .unwrap();

        let t = table.clone().drop_columns(|c| c == "b");
        assert_eq!(t.columns, vec!["a", "c"]);
        assert_eq!(t.rows[0], vec![Value::Num(1.), Value::Missing]);

        let t = table
            .clone()
            .select(&["c".into(), "a".into()])
            .unwrap();
        assert_eq!(t.rows[0], vec![Value::Missing, Value::Num(1.)]);
        assert!(table.clone().select(&["z".into()]).is_err());

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), "alpha".to_string());
        let t = table.clone().rename(&map).unwrap();
        assert_eq!(t.columns, vec!["alpha", "b", "c"]);

        map.insert("b".to_string(), "c".to_string());
        assert!(table.rename(&map).is_err());
    }
}
