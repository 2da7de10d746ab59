use std::collections::BTreeMap;
use log::debug;
use crate::array::DenseArray;
use crate::block_array::{BlockArray, Extrema};
use crate::boundary::stagger_of;
use crate::error::{Error, Result};
use crate::halo::HaloFillEngine;
use crate::snapshot::Snapshot;
use super::geometry::Geometry;
use super::{check_schema, time_key, Attribute, Extracted, Form, RecordBody, SnapshotRecord};




#[derive(Clone, Debug, Default, PartialEq)]


/**
 * The halo-filled block arrays of every field in a snapshot, by name.
 */
pub struct Fields {
    arrays: BTreeMap<String, BlockArray>,
}

impl Fields {
    pub fn get(&self, name: &str) -> Result<&BlockArray> {
        self.arrays.get(name).ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    pub fn interior(&self, name: &str) -> Result<DenseArray> {
        Ok(self.get(name)?.interior())
    }

    pub fn extrema(&self, name: &str) -> Result<Option<Extrema>> {
        Ok(self.get(name)?.extrema())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.arrays.keys().map(String::as_str)
    }
}

impl RecordBody for Fields {
    const KIND: &'static str = "FieldRecord";

    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        match name.strip_prefix('_') {
            Some(base) => self.arrays.get(base).map(Attribute::Halo),
            None => self.arrays.get(name).map(Attribute::Array),
        }
    }
}

pub type FieldRecord = SnapshotRecord<Fields>;




// ============================================================================
impl SnapshotRecord<Fields> {


    /**
     * Read every unknown of a snapshot, and for checkpoints the staggered
     * velocity components, into halo-extended arrays and fill their guard
     * cells.
     */
    pub fn from_snapshot(snapshot: &Snapshot, form: Form, geometry: &Geometry) -> Result<Self> {
        let staggered = match form {
            Form::Checkpoint if geometry.dim() >= 2 => &["fcx2", "fcy2", "fcz2"][..geometry.dim()],
            _ => &[][..],
        };
        let mut names: Vec<String> = Vec::new();

        for name in snapshot.unknown_names().iter().map(|n| n.trim_end()).chain(staggered.iter().copied()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        let engine = HaloFillEngine::new(geometry.neighbors());
        let context = geometry.boundary_context();
        let mut arrays = BTreeMap::new();

        for name in &names {
            let raw = snapshot.dataset(name)?;
            let mut array = BlockArray::from_raw(name, raw, geometry.cells(), geometry.guard(), stagger_of(name))?;
            engine.fill(&mut array, name, &context)?;
            debug!("filled guard cells of {}", name);
            arrays.insert(name.clone(), array);
        }
        check_schema(Extracted { key: time_key(snapshot), names: Some(names), body: Fields { arrays } })
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::FieldRecord;
    use crate::error::Error;
    use crate::record::fixture;
    use crate::record::geometry::GeometryRecord;
    use crate::record::{Attribute, Form, Record};
    use crate::series::Keyed;

    fn read(form: Form) -> FieldRecord {
        let snapshot = fixture::snapshot("setup +ug", 2.0);
        let geometry = GeometryRecord::from_snapshot(&snapshot, None).unwrap();
        FieldRecord::from_snapshot(&snapshot, form, &geometry).unwrap()
    }

    #[test]
    fn plot_fields_are_the_unknowns() {
        let fields = read(Form::Plot);
        assert_eq!(fields.key(), 2.0);
        assert_eq!(fields.keys(), vec!["dens", "temp", "pres"]);
        assert_eq!(fields.interior("dens").unwrap(), fixture::cell_data(2.0));
    }

    #[test]
    fn checkpoint_adds_staggered_velocity() {
        let fields = read(Form::Checkpoint);
        assert_eq!(fields.keys(), vec!["dens", "temp", "pres", "fcx2", "fcy2"]);
        assert_eq!(fields.get("fcx2").unwrap().get(1, [1, 1, 5]), 0.0);
    }

    #[test]
    fn staggered_velocity_keeps_its_boundary_faces() {
        let fields = read(Form::Checkpoint);
        let u = fields.get("fcx2").unwrap();
        assert_eq!(u.get(0, [1, 1, 0]), 1.0);
        assert_eq!(u.get(0, [1, 2, 0]), 11.0);
        assert_eq!(u.get(1, [1, 1, 4]), 105.0);
        assert_eq!(u.get(1, [1, 1, 5]), 0.0);
        assert_eq!(u.get(0, [1, 1, 5]), 102.0);
        assert_eq!(u.get(1, [1, 1, 0]), 5.0);

        let v = fields.get("fcy2").unwrap();
        assert_eq!(v.get(0, [1, 0, 1]), 1.0);
        assert_eq!(v.get(0, [1, 2, 1]), 21.0);
        assert_eq!(v.get(0, [1, 3, 1]), 0.0);
    }

    #[test]
    fn listed_staggered_fields_are_read_once() {
        let snapshot = fixture::snapshot("setup +ug", 2.0).with_unknown_names(["dens", "fcx2", "temp", "dens "]);
        let geometry = GeometryRecord::from_snapshot(&snapshot, None).unwrap();
        let fields = FieldRecord::from_snapshot(&snapshot, Form::Checkpoint, &geometry).unwrap();
        assert_eq!(fields.keys(), vec!["dens", "fcx2", "temp", "fcy2"]);
    }

    #[test]
    fn guards_are_copied_from_neighbors() {
        let fields = read(Form::Plot);
        let dens = fields.get("dens").unwrap();
        assert_eq!(dens.get(0, [1, 1, 5]), dens.get(1, [1, 1, 1]));
        assert_eq!(dens.get(1, [1, 2, 0]), dens.get(0, [1, 2, 4]));
    }

    #[test]
    fn temperature_guards_follow_boundary_conditions() {
        let fields = read(Form::Plot);
        let temp = fields.get("temp").unwrap();
        assert_eq!(temp.get(1, [1, 1, 5]), 2.0 - temp.get(1, [1, 1, 4]));
        assert_eq!(temp.get(0, [1, 1, 0]), -temp.get(0, [1, 1, 1]));
        assert_eq!(temp.get(0, [1, 0, 2]), temp.get(0, [1, 1, 2]));
    }

    #[test]
    fn underscore_names_include_guard_cells() {
        let fields = read(Form::Plot);
        let interior = fields.attribute("dens").and_then(|a| a.to_dense()).unwrap();
        let halo = fields.attribute("_dens").and_then(|a| a.to_dense()).unwrap();
        assert_eq!(interior.shape(), &[2, 1, 2, 4]);
        assert_eq!(halo.shape(), &[2, 3, 4, 6]);
        assert!(matches!(fields.attribute("_dens"), Some(Attribute::Halo(_))));
        assert!(matches!(fields.get("velx"), Err(Error::UnknownAttribute(_))));
    }
}
