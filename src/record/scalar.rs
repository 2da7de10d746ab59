use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::snapshot::{Scalar, Snapshot, INTEGER_SCALARS, REAL_SCALARS};
use super::{check_schema, time_key, Attribute, Extracted, RecordBody, SnapshotRecord};




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]


/**
 * Where to find one scalar in a snapshot: the table, the label to search
 * for, and the name to expose it under (the label itself if absent).
 */
pub struct ScalarSpec {
    pub group: String,
    pub dataset: String,
    pub name: Option<String>,
}

impl ScalarSpec {
    pub fn new(group: &str, dataset: &str) -> Self {
        Self { group: group.to_string(), dataset: dataset.to_string(), name: None }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.dataset)
    }

    pub fn flash_defaults() -> Vec<Self> {
        vec![
            Self::new(REAL_SCALARS, "time").named("t"),
            Self::new(REAL_SCALARS, "dt"),
            Self::new(INTEGER_SCALARS, "nstep"),
            Self::new(INTEGER_SCALARS, "nbegin"),
        ]
    }
}




#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scalars {
    values: BTreeMap<String, Scalar>,
}

impl Scalars {
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.values.get(name)
    }
}

impl RecordBody for Scalars {
    const KIND: &'static str = "ScalarRecord";

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        self.values.get(name).map(Attribute::from)
    }
}

pub type ScalarRecord = SnapshotRecord<Scalars>;




// ============================================================================
impl SnapshotRecord<Scalars> {


    /**
     * Read each requested scalar from the snapshot. Every entry must resolve
     * to a table entry.
     */
    pub fn from_snapshot(snapshot: &Snapshot, specs: &[ScalarSpec]) -> Result<Self> {
        let mut values = BTreeMap::new();

        for spec in specs {
            let value = snapshot.find(&spec.group, &spec.dataset)?;
            values.insert(spec.label().to_string(), value.clone());
        }
        let names = Some(specs.iter().map(|s| s.label().to_string()).collect());
        check_schema(Extracted { key: time_key(snapshot), names, body: Scalars { values } })
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{ScalarRecord, ScalarSpec};
    use crate::error::Error;
    use crate::record::{Attribute, Record};
    use crate::series::Keyed;
    use crate::snapshot::Snapshot;

    fn snapshot() -> Snapshot {
        Snapshot::new()
            .with_entry("real scalars", "time", 1.5)
            .with_entry("real scalars", "dt", 0.01)
            .with_entry("integer scalars", "nstep", 30)
            .with_entry("integer scalars", "nbegin", 1)
    }

    #[test]
    fn default_scalars_are_keyed_by_time() {
        let record = ScalarRecord::from_snapshot(&snapshot(), &ScalarSpec::flash_defaults()).unwrap();
        assert_eq!(record.key(), 1.5);
        assert_eq!(record.attribute("t"), Some(Attribute::Real(1.5)));
        assert_eq!(record.attribute("nstep"), Some(Attribute::Int(30)));
        assert_eq!(record.keys(), vec!["t", "dt", "nstep", "nbegin"]);
    }

    #[test]
    fn missing_scalar_is_a_schema_error() {
        let specs = vec![ScalarSpec::new("real scalars", "redshift")];
        assert!(matches!(ScalarRecord::from_snapshot(&snapshot(), &specs), Err(Error::MissingField { .. })));
    }

    #[test]
    fn snapshot_without_time_has_no_key() {
        let snapshot = Snapshot::new().with_entry("integer scalars", "nstep", 1);
        let specs = vec![ScalarSpec::new("integer scalars", "nstep")];
        assert!(matches!(ScalarRecord::from_snapshot(&snapshot, &specs), Err(Error::MissingKey { .. })));
    }
}
