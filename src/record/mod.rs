pub mod field;
pub mod geometry;
pub mod scalar;
pub mod statics;

#[cfg(test)]
pub(crate) mod fixture;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::array::DenseArray;
use crate::block_array::BlockArray;
use crate::error::{Error, Result};
use crate::series::Keyed;
use crate::snapshot::{Scalar, Snapshot, Table, REAL_SCALARS};
use self::geometry::StaggeredMesh;




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Code {
    Flash,
}

impl FromStr for Code {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flash" => Ok(Code::Flash),
            _ => Err(Error::UnsupportedCode(s.to_string())),
        }
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    Plot,
    Checkpoint,
}

impl Form {
    pub fn name(self) -> &'static str {
        match self {
            Form::Plot => "plt",
            Form::Checkpoint => "chk",
        }
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * A supported (code, file form) pair.
 */
pub struct Format {
    pub code: Code,
    pub form: Form,
}

impl Format {


    /**
     * Validate a caller-declared code and form. Only FLASH plot (`plt`) and
     * checkpoint (`chk`) files are supported.
     */
    pub fn parse(code: &str, form: &str) -> Result<Self> {
        let code: Code = code.parse()?;

        let form = match (code, form) {
            (Code::Flash, "plt") => Form::Plot,
            (Code::Flash, "chk") => Form::Checkpoint,
            _ => return Err(Error::UnsupportedForm { code: String::from("flash"), form: form.to_string() }),
        };
        Ok(Self { code, form })
    }
}

impl Default for Format {
    fn default() -> Self {
        Self { code: Code::Flash, form: Form::Plot }
    }
}




#[derive(Clone, Copy, Debug, PartialEq)]


/**
 * A borrowed view of one named attribute of a record.
 */
pub enum Attribute<'a> {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(&'a str),
    /// A block field, read without its guard cells.
    Array(&'a BlockArray),
    /// A block field including its guard cells.
    Halo(&'a BlockArray),
    Dense(&'a DenseArray),
    Mesh(&'a StaggeredMesh),
    MeshHalo(&'a StaggeredMesh),
    Table(&'a Table),
}




// ============================================================================
impl<'a> Attribute<'a> {


    /**
     * Return the attribute as a numeric array: scalars become zero-rank
     * arrays and meshes gain a leading stagger axis. Text and tables are
     * not numeric.
     */
    pub fn to_dense(&self) -> Option<DenseArray> {
        match self {
            Attribute::Int(i) => Some(DenseArray::scalar(*i as f64)),
            Attribute::Real(x) => Some(DenseArray::scalar(*x)),
            Attribute::Bool(b) => Some(DenseArray::scalar(if *b { 1.0 } else { 0.0 })),
            Attribute::Array(a) => Some(a.interior()),
            Attribute::Halo(a) => Some(a.to_dense()),
            Attribute::Dense(a) => Some((*a).clone()),
            Attribute::Mesh(m) => Some(m.interior()),
            Attribute::MeshHalo(m) => Some(m.to_dense()),
            Attribute::Text(_) | Attribute::Table(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Attribute::Int(i) => Some(*i as f64),
            Attribute::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Attribute::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&'a Table> {
        match self {
            Attribute::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl<'a> From<&'a Scalar> for Attribute<'a> {
    fn from(value: &'a Scalar) -> Self {
        match value {
            Scalar::Int(i) => Attribute::Int(*i),
            Scalar::Real(x) => Attribute::Real(*x),
            Scalar::Bool(b) => Attribute::Bool(*b),
            Scalar::Text(s) => Attribute::Text(s),
        }
    }
}

impl<'a> fmt::Display for Attribute<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Int(i) => write!(f, "{}", i),
            Attribute::Real(x) => write!(f, "{}", x),
            Attribute::Bool(b) => write!(f, "{}", b),
            Attribute::Text(s) => write!(f, "{}", s),
            Attribute::Array(a) | Attribute::Halo(a) => write!(f, "<block array {} x {:?}>", a.blocks(), a.extent()),
            Attribute::Dense(a) => write!(f, "<array {:?}>", a.shape()),
            Attribute::Mesh(m) | Attribute::MeshHalo(m) => write!(f, "<mesh {:?}>", m.center.extent()),
            Attribute::Table(t) => write!(f, "<table of {}>", t.len()),
        }
    }
}




/**
 * The reflection surface of a keyed snapshot record: the names of its
 * attributes, and each attribute by name. Block data is read without guard
 * cells; prefixing its name with an underscore (`_dens`) includes them.
 */
pub trait Record: Keyed {
    fn kind(&self) -> &'static str;

    fn keys(&self) -> Vec<&str>;

    fn attribute(&self, name: &str) -> Option<Attribute<'_>>;

    fn to_dict(&self) -> BTreeMap<&str, Attribute<'_>> {
        self.keys()
            .into_iter()
            .filter_map(|name| self.attribute(name).map(|a| (name, a)))
            .collect()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn keys(&self) -> Vec<&str> {
        (**self).keys()
    }

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        (**self).attribute(name)
    }
}




/**
 * The data specific to one kind of record.
 */
pub trait RecordBody {
    const KIND: &'static str;

    fn attribute(&self, name: &str) -> Option<Attribute<'_>>;
}




/**
 * The output of a record extraction, before validation. Extraction leaves
 * the key or the attribute names unset when the snapshot does not provide
 * them.
 */
pub struct Extracted<T> {
    pub key: Option<f64>,
    pub names: Option<Vec<String>>,
    pub body: T,
}




/**
 * A validated snapshot record: a time key, the names of its attributes,
 * and the kind-specific body.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotRecord<T> {
    key: f64,
    names: Vec<String>,
    body: T,
}

impl<T> SnapshotRecord<T> {
    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<T> Deref for SnapshotRecord<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.body
    }
}

impl<T: RecordBody> Keyed for SnapshotRecord<T> {
    fn key(&self) -> f64 {
        self.key
    }
}

impl<T: RecordBody> Record for SnapshotRecord<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn keys(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        let base = name.strip_prefix('_').unwrap_or(name);

        if self.names.iter().any(|n| n == base) {
            self.body.attribute(name)
        } else {
            None
        }
    }
}

impl<T: RecordBody> fmt::Display for SnapshotRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(key={:.4}, {})", T::KIND, self.key, self.names.join(", "))
    }
}




/**
 * Turn an extraction into a record, failing if it left the key or the
 * attribute names unset.
 */
pub fn check_schema<T: RecordBody>(extracted: Extracted<T>) -> Result<SnapshotRecord<T>> {
    let key = extracted
        .key
        .filter(|k| !k.is_nan())
        .ok_or(Error::MissingKey { kind: T::KIND })?;
    let names = extracted.names.ok_or(Error::MissingAttributes { kind: T::KIND })?;
    Ok(SnapshotRecord { key, names, body: extracted.body })
}


/**
 * The simulation time of a snapshot: the first real scalar whose label
 * contains "time".
 */
pub(crate) fn time_key(snapshot: &Snapshot) -> Option<f64> {
    snapshot.table_opt(REAL_SCALARS)?.find("time")?.as_f64()
}
