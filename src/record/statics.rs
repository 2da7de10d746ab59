use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::snapshot::{reduce_label, Scalar, Snapshot, Table};
use crate::snapshot::{INTEGER_RUNTIME_PARAMETERS, LOGICAL_RUNTIME_PARAMETERS, REAL_RUNTIME_PARAMETERS, STRING_RUNTIME_PARAMETERS};
use crate::snapshot::{INTEGER_SCALARS, LOGICAL_SCALARS, REAL_SCALARS, SIM_INFO, STRING_SCALARS};
use super::{check_schema, time_key, Attribute, Extracted, RecordBody, SnapshotRecord};




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]


/**
 * What to do with the values of a table as they are read.
 */
pub enum LabelTransform {
    Pass,
    /// Trim text values and replace their inner spaces with the sentinel.
    Reduce { sentinel: char },
}

impl LabelTransform {
    fn apply(self, value: &Scalar) -> Scalar {
        match (self, value) {
            (LabelTransform::Reduce { sentinel }, Scalar::Text(s)) => Scalar::Text(reduce_label(s, sentinel)),
            _ => value.clone(),
        }
    }
}




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticSpec {
    pub group: String,
    pub transform: LabelTransform,
}

impl StaticSpec {
    pub fn new(group: &str, transform: LabelTransform) -> Self {
        Self { group: group.to_string(), transform }
    }

    pub fn pass(group: &str) -> Self {
        Self::new(group, LabelTransform::Pass)
    }

    pub fn reduce(group: &str, sentinel: char) -> Self {
        Self::new(group, LabelTransform::Reduce { sentinel })
    }


    /**
     * The tables that change from one snapshot to the next.
     */
    pub fn dynamics_defaults() -> Vec<Self> {
        vec![
            Self::pass(INTEGER_SCALARS),
            Self::pass(LOGICAL_SCALARS),
            Self::pass(REAL_SCALARS),
            Self::reduce(STRING_SCALARS, '_'),
        ]
    }


    /**
     * The tables fixed for a whole run: runtime parameters and the setup
     * description.
     */
    pub fn statics_defaults() -> Vec<Self> {
        vec![
            Self::pass(INTEGER_RUNTIME_PARAMETERS),
            Self::pass(LOGICAL_RUNTIME_PARAMETERS),
            Self::pass(REAL_RUNTIME_PARAMETERS),
            Self::reduce(STRING_RUNTIME_PARAMETERS, '_'),
            Self::reduce(SIM_INFO, ' '),
        ]
    }
}




#[derive(Clone, Debug, Default, PartialEq)]


/**
 * Whole metadata tables, keyed by the reduced table name (`real_scalars`,
 * `sim_info`, ...), with reduced labels.
 */
pub struct Statics {
    groups: BTreeMap<String, Table>,
}

impl Statics {
    pub fn group(&self, name: &str) -> Option<&Table> {
        self.groups.get(name)
    }

    pub fn lookup(&self, group: &str, label: &str) -> Option<&Scalar> {
        self.group(group)?.get(label)
    }
}

impl RecordBody for Statics {
    const KIND: &'static str = "StaticRecord";

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        self.groups.get(name).map(Attribute::Table)
    }
}

pub type StaticRecord = SnapshotRecord<Statics>;




// ============================================================================
impl SnapshotRecord<Statics> {
    pub fn from_snapshot(snapshot: &Snapshot, specs: &[StaticSpec]) -> Result<Self> {
        let mut groups = BTreeMap::new();

        for spec in specs {
            let table: Table = snapshot
                .table(&spec.group)?
                .iter()
                .map(|(label, value)| (reduce_label(label, '_'), spec.transform.apply(value)))
                .collect();
            groups.insert(reduce_label(&spec.group, '_'), table);
        }
        let names = Some(specs.iter().map(|s| reduce_label(&s.group, '_')).collect());
        check_schema(Extracted { key: time_key(snapshot), names, body: Statics { groups } })
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{StaticRecord, StaticSpec};
    use crate::record::Record;
    use crate::snapshot::{Scalar, Snapshot};

    fn snapshot() -> Snapshot {
        Snapshot::new()
            .with_entry("real scalars", "time    ", 2.0)
            .with_entry("string scalars", "run comment", "lid driven  ")
            .with_entry("sim info", "setup call", "./setup INS +ug  ")
    }

    #[test]
    fn labels_and_text_values_are_reduced() {
        let specs = vec![StaticSpec::reduce("string scalars", '_'), StaticSpec::reduce("sim info", ' ')];
        let record = StaticRecord::from_snapshot(&snapshot(), &specs).unwrap();
        assert_eq!(record.keys(), vec!["string_scalars", "sim_info"]);
        assert_eq!(record.lookup("string_scalars", "run_comment"), Some(&Scalar::from("lid_driven")));
        assert_eq!(record.lookup("sim_info", "setup_call"), Some(&Scalar::from("./setup INS +ug")));
    }

    #[test]
    fn tables_are_exposed_as_attributes() {
        let record = StaticRecord::from_snapshot(&snapshot(), &[StaticSpec::pass("real scalars")]).unwrap();
        let table = record.attribute("real_scalars").and_then(|a| a.as_table()).unwrap();
        assert_eq!(table.get("time"), Some(&Scalar::Real(2.0)));
    }

    #[test]
    fn missing_table_is_an_error() {
        assert!(StaticRecord::from_snapshot(&snapshot(), &StaticSpec::statics_defaults()).is_err());
    }
}
