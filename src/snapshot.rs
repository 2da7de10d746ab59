use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use log::debug;
use serde::{Deserialize, Serialize};
use crate::array::DenseArray;
use crate::error::{Error, Result};




pub const INTEGER_SCALARS: &str = "integer scalars";
pub const REAL_SCALARS: &str = "real scalars";
pub const LOGICAL_SCALARS: &str = "logical scalars";
pub const STRING_SCALARS: &str = "string scalars";
pub const INTEGER_RUNTIME_PARAMETERS: &str = "integer runtime parameters";
pub const REAL_RUNTIME_PARAMETERS: &str = "real runtime parameters";
pub const LOGICAL_RUNTIME_PARAMETERS: &str = "logical runtime parameters";
pub const STRING_RUNTIME_PARAMETERS: &str = "string runtime parameters";
pub const SIM_INFO: &str = "sim info";




/**
 * Strip trailing whitespace from a label or value, and replace the spaces
 * that remain with the given sentinel.
 */
pub fn reduce_label(value: &str, sentinel: char) -> String {
    value.trim_end().replace(' ', &sentinel.to_string())
}




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]


/**
 * A value in one of a snapshot's metadata tables.
 */
pub enum Scalar {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
}




// ============================================================================
impl Scalar {

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Real(x) if x.fract() == 0.0 => Some(*x as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Real(x) => write!(f, "{}", x),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Real(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}




#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]


/**
 * An ordered list of `(label, value)` pairs. Labels may carry trailing
 * padding, and are not required to be unique.
 */
pub struct Table {
    entries: Vec<(String, Scalar)>,
}




// ============================================================================
impl Table {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<Scalar>>(mut self, label: &str, value: V) -> Self {
        self.push(label, value);
        self
    }

    pub fn push<V: Into<Scalar>>(&mut self, label: &str, value: V) {
        self.entries.push((label.to_string(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> + '_ {
        self.entries.iter().map(|(label, value)| (label.as_str(), value))
    }


    /**
     * Return the first entry whose label contains the given text. When
     * several labels match, the one stored first wins.
     */
    pub fn find(&self, needle: &str) -> Option<&Scalar> {
        self.iter().find(|(label, _)| label.contains(needle)).map(|(_, value)| value)
    }


    /**
     * Return the entry whose label, ignoring trailing padding, equals the
     * given name.
     */
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.iter().find(|(label, _)| label.trim_end() == name).map(|(_, value)| value)
    }
}

impl<S: Into<String>> FromIterator<(S, Scalar)> for Table {
    fn from_iter<I: IntoIterator<Item = (S, Scalar)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(label, value)| (label.into(), value)).collect() }
    }
}




#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]


/**
 * Everything read from one snapshot file: named metadata tables, named
 * datasets, the block tree, refinement levels, and the names of the
 * unknowns stored as datasets.
 */
pub struct Snapshot {
    #[serde(default)]
    tables: BTreeMap<String, Table>,
    #[serde(default)]
    datasets: BTreeMap<String, DenseArray>,
    #[serde(default)]
    tree: Option<Vec<Vec<i64>>>,
    #[serde(default)]
    refine_level: Option<Vec<i64>>,
    #[serde(default)]
    unknown_names: Vec<String>,
}




// ============================================================================
impl Snapshot {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, table: Table) -> Self {
        self.tables.insert(name.to_string(), table);
        self
    }


    /**
     * Append one entry to a named table, creating the table if needed.
     */
    pub fn with_entry<V: Into<Scalar>>(mut self, table: &str, label: &str, value: V) -> Self {
        self.tables.entry(table.to_string()).or_default().push(label, value);
        self
    }

    pub fn with_dataset(mut self, name: &str, data: DenseArray) -> Self {
        self.datasets.insert(name.to_string(), data);
        self
    }

    pub fn with_tree(mut self, tree: Vec<Vec<i64>>) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn with_refine_level(mut self, levels: Vec<i64>) -> Self {
        self.refine_level = Some(levels);
        self
    }

    pub fn with_unknown_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unknown_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables.get(name).ok_or_else(|| Error::MissingField {
            context: String::from("snapshot tables"),
            name: name.to_string(),
        })
    }

    pub fn table_opt(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }


    /**
     * Return the first value in the named table whose label contains
     * `needle`, failing with a schema error if there is none.
     */
    pub fn find(&self, table: &str, needle: &str) -> Result<&Scalar> {
        self.table(table)?.find(needle).ok_or_else(|| Error::MissingField {
            context: table.to_string(),
            name: needle.to_string(),
        })
    }

    pub fn find_int(&self, table: &str, needle: &str) -> Result<i64> {
        let value = self.find(table, needle)?;
        value.as_i64().ok_or_else(|| Error::MissingField {
            context: format!("{} (integer)", table),
            name: needle.to_string(),
        })
    }

    pub fn find_real(&self, table: &str, needle: &str) -> Result<f64> {
        let value = self.find(table, needle)?;
        value.as_f64().ok_or_else(|| Error::MissingField {
            context: format!("{} (real)", table),
            name: needle.to_string(),
        })
    }

    pub fn dataset(&self, name: &str) -> Result<&DenseArray> {
        self.datasets.get(name).ok_or_else(|| Error::MissingField {
            context: String::from("snapshot datasets"),
            name: name.to_string(),
        })
    }

    pub fn tree(&self) -> Result<&[Vec<i64>]> {
        self.tree.as_deref().ok_or_else(|| Error::MissingField {
            context: String::from("snapshot datasets"),
            name: String::from("gid"),
        })
    }

    pub fn refine_level(&self) -> Option<&[i64]> {
        self.refine_level.as_deref()
    }

    pub fn unknown_names(&self) -> &[String] {
        &self.unknown_names
    }


    /**
     * Write this snapshot to a file with the given encoding.
     */
    pub fn write(&self, path: &Path, encoding: Encoding) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let encode_error = |message: String| Error::Encode { path: path.to_path_buf(), message };

        match encoding {
            Encoding::Cbor => ciborium::ser::into_writer(self, &mut writer)
                .map_err(|e| encode_error(format!("{:?}", e)))?,
            Encoding::MessagePack => rmp_serde::encode::write(&mut writer, self)
                .map_err(|e| encode_error(e.to_string()))?,
        }
        debug!("wrote snapshot {}", path.display());
        Ok(())
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    Cbor,
    MessagePack,
}

impl Encoding {


    /**
     * Guess the encoding from a file extension: `.msgpack` and `.mpk` are
     * MessagePack, anything else is CBOR.
     */
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("msgpack") | Some("mpk") => Encoding::MessagePack,
            _ => Encoding::Cbor,
        }
    }
}




/**
 * Opens snapshot files. Implementations hold no handle beyond the call to
 * `open`: the file is released before the snapshot is returned, or on any
 * failure.
 */
pub trait SnapshotSource {
    fn open(&self, path: &Path) -> Result<Snapshot>;
}




#[derive(Clone, Copy, Debug, Default)]


/**
 * Reads snapshots from serialized files on disk.
 */
pub struct FileSource {
    encoding: Option<Encoding>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: Encoding) -> Self {
        Self { encoding: Some(encoding) }
    }
}

impl SnapshotSource for FileSource {
    fn open(&self, path: &Path) -> Result<Snapshot> {
        let encoding = self.encoding.unwrap_or_else(|| Encoding::from_path(path));
        let reader = BufReader::new(File::open(path)?);
        let decode_error = |message: String| Error::Decode { path: path.to_path_buf(), message };

        debug!("reading snapshot {} ({:?})", path.display(), encoding);

        match encoding {
            Encoding::Cbor => ciborium::de::from_reader(reader).map_err(|e| decode_error(format!("{:?}", e))),
            Encoding::MessagePack => rmp_serde::from_read(reader).map_err(|e| decode_error(e.to_string())),
        }
    }
}




#[derive(Clone, Debug, Default)]


/**
 * Serves snapshots held in memory, keyed by path.
 */
pub struct MemorySource {
    snapshots: HashMap<PathBuf, Snapshot>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, snapshot: Snapshot) {
        self.snapshots.insert(path.into(), snapshot);
    }

    pub fn with<P: Into<PathBuf>>(mut self, path: P, snapshot: Snapshot) -> Self {
        self.insert(path, snapshot);
        self
    }
}

impl SnapshotSource for MemorySource {
    fn open(&self, path: &Path) -> Result<Snapshot> {
        self.snapshots.get(path).cloned().ok_or_else(|| {
            Error::Io(std::io::Error::new(ErrorKind::NotFound, format!("no snapshot at {}", path.display())))
        })
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use std::path::Path;
    use super::{reduce_label, Encoding, FileSource, MemorySource, Scalar, Snapshot, SnapshotSource, Table};
    use crate::array::DenseArray;

    fn snapshot() -> Snapshot {
        Snapshot::new()
            .with_entry("real scalars", "time                ", 1.5)
            .with_entry("integer scalars", "nxb", 8)
            .with_entry("string runtime parameters", "xl_boundary_type    ", "noslip_ins  ")
            .with_dataset("dens", DenseArray::zeros(vec![1, 1, 2, 2]))
            .with_tree(vec![vec![-1, -1, -1, -1]])
            .with_unknown_names(vec!["dens"])
    }

    #[test]
    fn reduce_label_works() {
        assert_eq!(reduce_label("string scalars  ", '_'), "string_scalars");
        assert_eq!(reduce_label("setup call ", ' '), "setup call");
    }

    #[test]
    fn table_lookup_by_substring_takes_first_match() {
        let table = Table::new().with("time step", 0.1).with("time", 2.0);
        assert_eq!(table.find("time"), Some(&Scalar::Real(0.1)));
        assert_eq!(table.get("time"), Some(&Scalar::Real(2.0)));
        assert_eq!(table.find("dt"), None);
    }

    #[test]
    fn snapshot_lookups_report_missing_entries() {
        let s = snapshot();
        assert_eq!(s.find_real("real scalars", "time").unwrap(), 1.5);
        assert_eq!(s.find_int("integer scalars", "nxb").unwrap(), 8);
        assert!(s.find("integer scalars", "nyb").is_err());
        assert!(s.dataset("pres").is_err());
        assert!(s.table("sim info").is_err());
    }

    #[test]
    fn memory_source_serves_copies() {
        let source = MemorySource::new().with("a", snapshot());
        assert_eq!(source.open(Path::new("a")).unwrap(), snapshot());
        assert!(source.open(Path::new("b")).is_err());
    }

    #[test]
    fn file_source_reads_both_encodings() {
        let dir = std::env::temp_dir();

        for (name, encoding) in [("flashio-snapshot.cbor", Encoding::Cbor), ("flashio-snapshot.msgpack", Encoding::MessagePack)] {
            let path = dir.join(format!("{}-{}", std::process::id(), name));
            snapshot().write(&path, encoding).unwrap();
            let read = FileSource::new().open(&path).unwrap();
            std::fs::remove_file(&path).unwrap();
            assert_eq!(read, snapshot());
        }
    }
}
