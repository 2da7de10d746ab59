use std::path::PathBuf;
use log::info;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::index_space::Axis;
use crate::names::FileNames;
use crate::record::field::FieldRecord;
use crate::record::geometry::GeometryRecord;
use crate::record::scalar::{ScalarRecord, ScalarSpec};
use crate::record::statics::{StaticRecord, StaticSpec};
use crate::record::{Attribute, Format, Record};
use crate::select::{Position, Selector};
use crate::series::{Keyed, SortedSeries};
use crate::snapshot::{Snapshot, SnapshotSource};




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]


/**
 * What to read from each snapshot of a run.
 */
pub struct DatasetOptions {
    pub code: String,
    pub form: String,
    pub scalars: Vec<ScalarSpec>,
    pub dynamics: Vec<StaticSpec>,
    pub statics: Vec<StaticSpec>,
    /// Companion grid snapshot, required for stretched (`+rg`) grids.
    pub grid_file: Option<PathBuf>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            code: String::from("flash"),
            form: String::from("plt"),
            scalars: ScalarSpec::flash_defaults(),
            dynamics: StaticSpec::dynamics_defaults(),
            statics: StaticSpec::statics_defaults(),
            grid_file: None,
        }
    }
}




#[derive(Clone, Debug, PartialEq)]


/**
 * Where a per-snapshot value lives in a dataset: a named field or scalar,
 * or one labeled entry of a metadata table. Field names take the same
 * underscore prefix as record attributes to include guard cells.
 */
pub enum DataPath {
    Fields(String),
    Scalars(String),
    Dynamics { table: String, name: String },
}

impl DataPath {
    pub fn field(name: &str) -> Self {
        Self::Fields(name.to_string())
    }

    pub fn scalar(name: &str) -> Self {
        Self::Scalars(name.to_string())
    }

    pub fn dynamic(table: &str, name: &str) -> Self {
        Self::Dynamics { table: table.to_string(), name: name.to_string() }
    }
}




#[derive(Clone, Copy, Debug, PartialEq)]


/**
 * One value read through a `DataPath`, keyed by the time of the snapshot
 * it came from.
 */
pub struct Sample<'a> {
    pub time: f64,
    pub value: Attribute<'a>,
}

impl<'a> Keyed for Sample<'a> {
    fn key(&self) -> f64 {
        self.time
    }
}




/**
 * The snapshots of one simulation run, read into time-ordered series. The
 * geometry and the run-wide static parameters come from the first file;
 * fields, scalars, and the per-snapshot metadata tables come from every
 * file.
 */
pub struct SimulationDataset {
    format: Format,
    files: Vec<PathBuf>,
    geometry: GeometryRecord,
    statics: StaticRecord,
    fields: SortedSeries<FieldRecord>,
    scalars: SortedSeries<ScalarRecord>,
    dynamics: SortedSeries<StaticRecord>,
    options: DatasetOptions,
}




// ============================================================================
impl SimulationDataset {


    /**
     * Read every file, in any order. Fails if any snapshot cannot be read,
     * or if two snapshots report the same time.
     */
    pub fn open<S: SnapshotSource + ?Sized>(source: &S, files: &[PathBuf], options: DatasetOptions) -> Result<Self> {
        let format = Format::parse(&options.code, &options.form)?;
        let (first_path, rest) = files.split_first().ok_or(Error::NoFiles)?;

        info!("opening {} {} snapshots", files.len(), format.form.name());
        info!("processing metadata from {}", first_path.display());

        let first = source.open(first_path)?;
        let grid = match &options.grid_file {
            Some(path) => Some(source.open(path)?),
            None => None,
        };
        let geometry = GeometryRecord::from_snapshot(&first, grid.as_ref())?;
        let statics = StaticRecord::from_snapshot(&first, &options.statics)?;

        info!("{} grid of {} blocks in {}D", geometry.grid(), geometry.blocks(), geometry.dim());

        let mut dataset = Self {
            format,
            files: files.to_vec(),
            geometry,
            statics,
            fields: SortedSeries::new(),
            scalars: SortedSeries::new(),
            dynamics: SortedSeries::new(),
            options,
        };
        info!("processing file {}", first_path.display());
        dataset.append_snapshot(&first)?;

        for path in rest {
            info!("processing file {}", path.display());
            let snapshot = source.open(path)?;
            dataset.append_snapshot(&snapshot)?;
        }
        Ok(dataset)
    }


    /**
     * Read the files named by a numeric range.
     */
    pub fn from_names<S, I>(source: &S, names: &FileNames, numbers: I, options: DatasetOptions) -> Result<Self>
    where
        S: SnapshotSource + ?Sized,
        I: IntoIterator<Item = usize>,
    {
        Self::open(source, &names.paths(numbers), options)
    }

    fn append_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let fields = FieldRecord::from_snapshot(snapshot, self.format.form, &self.geometry)?;
        let scalars = ScalarRecord::from_snapshot(snapshot, &self.options.scalars)?;
        let dynamics = StaticRecord::from_snapshot(snapshot, &self.options.dynamics)?;

        self.fields.append(fields)?;
        self.scalars.append(scalars)?;
        self.dynamics.append(dynamics)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn geometry(&self) -> &GeometryRecord {
        &self.geometry
    }

    pub fn statics(&self) -> &StaticRecord {
        &self.statics
    }

    pub fn fields(&self) -> &SortedSeries<FieldRecord> {
        &self.fields
    }

    pub fn scalars(&self) -> &SortedSeries<ScalarRecord> {
        &self.scalars
    }

    pub fn dynamics(&self) -> &SortedSeries<StaticRecord> {
        &self.dynamics
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }


    /**
     * Return the snapshot positions selected by times or positions. A
     * single time selects the first snapshot at or after it, and a single
     * position past the end selects nothing. Listed times and positions
     * resolve one by one, keeping their order and repeats.
     */
    pub fn indices<S: Into<Selector>>(&self, selector: S) -> Result<Vec<usize>> {
        match selector.into() {
            Selector::Key(time) => Ok(self.first_at_or_after(time).into_iter().collect()),
            Selector::Index(i) if i >= 0 && i as usize >= self.len() => Ok(Vec::new()),
            Selector::Many(at) => at.into_iter().map(|p| self.index_of(p)).collect(),
            other => self.fields.positions(other),
        }
    }

    fn first_at_or_after(&self, time: f64) -> Option<usize> {
        self.fields.keys().position(|k| k >= time)
    }


    /**
     * Resolve one entry of a list selector. Unlike a lone selector, a
     * listed time with no snapshot at or after it, or a listed position
     * past the end, is an error.
     */
    fn index_of(&self, at: Position) -> Result<usize> {
        match at {
            Position::Key(time) => self.first_at_or_after(time).ok_or(Error::NoKeyAtOrAfter(time)),
            index => self.fields.rank_of(index),
        }
    }

    pub fn times<S: Into<Selector>>(&self, selector: S) -> Result<Vec<f64>> {
        let keys: Vec<f64> = self.fields.keys().collect();
        Ok(self.indices(selector)?.into_iter().map(|i| keys[i]).collect())
    }



    /**
     * Read the value at one path from each snapshot selected by times or
     * positions, as a series keyed by time. Snapshots selected more than
     * once are read once.
     */
    pub fn data_from_path<S: Into<Selector>>(&self, path: &DataPath, selector: S) -> Result<SortedSeries<Sample<'_>>> {
        let mut ranks = self.indices(selector)?;
        ranks.sort_unstable();
        ranks.dedup();

        let samples = ranks
            .into_iter()
            .map(|rank| match path {
                DataPath::Fields(name) => sample(&self.fields, rank, name),
                DataPath::Scalars(name) => sample(&self.scalars, rank, name),
                DataPath::Dynamics { table, name } => {
                    let record = self.dynamics.get_by_index(rank as isize)?;
                    let value = record
                        .attribute(table)
                        .and_then(|a| a.as_table())
                        .and_then(|t| t.get(name))
                        .ok_or_else(|| Error::UnknownAttribute(format!("{}/{}", table, name)))?;
                    Ok(Sample { time: record.key(), value: Attribute::from(value) })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SortedSeries::from_sorted(samples))
    }

    pub fn blocks_from_plane(&self, axis: Axis, value: f64) -> Vec<usize> {
        self.geometry.blocks_from_plane(axis, value)
    }

    pub fn blocks_from_line(&self, planes: [(Axis, f64); 2]) -> Vec<usize> {
        self.geometry.blocks_from_line(planes)
    }
}


fn sample<'a, R: Record>(series: &'a SortedSeries<R>, rank: usize, name: &str) -> Result<Sample<'a>> {
    let record = series.get_by_index(rank as isize)?;
    let value = record.attribute(name).ok_or_else(|| Error::UnknownAttribute(name.to_string()))?;
    Ok(Sample { time: record.key(), value })
}
