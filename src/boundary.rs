use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use crate::adjacency::Face;
use crate::error::{Error, Result};
use crate::index_space::Axis;
use crate::snapshot::{Snapshot, REAL_RUNTIME_PARAMETERS, STRING_RUNTIME_PARAMETERS};




#[derive(Clone, Debug, PartialEq, Eq)]


/**
 * A physical boundary condition declared for one face of the domain.
 * Parsing ignores case, whitespace, and the solver suffixes (`_ins`,
 * `_ht`) used in runtime parameter values.
 */
pub enum BoundaryCondition {
    NoSlip,
    Slip,
    Neumann,
    Dirichlet,
    MovingLid,
    Outflow,
    Periodic,
    Other(String),
}

impl FromStr for BoundaryCondition {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let text: String = s.split_whitespace().collect::<String>().to_lowercase();
        let base = text
            .strip_suffix("_ins")
            .or_else(|| text.strip_suffix("_ht"))
            .unwrap_or(&text);

        Ok(match base {
            "noslip" => BoundaryCondition::NoSlip,
            "slip" => BoundaryCondition::Slip,
            "neumann" => BoundaryCondition::Neumann,
            "dirichlet" => BoundaryCondition::Dirichlet,
            "movlid" => BoundaryCondition::MovingLid,
            "outflow" => BoundaryCondition::Outflow,
            "periodic" => BoundaryCondition::Periodic,
            _ => BoundaryCondition::Other(text.clone()),
        })
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryCondition::NoSlip => f.write_str("noslip"),
            BoundaryCondition::Slip => f.write_str("slip"),
            BoundaryCondition::Neumann => f.write_str("neumann"),
            BoundaryCondition::Dirichlet => f.write_str("dirichlet"),
            BoundaryCondition::MovingLid => f.write_str("movlid"),
            BoundaryCondition::Outflow => f.write_str("outflow"),
            BoundaryCondition::Periodic => f.write_str("periodic"),
            BoundaryCondition::Other(s) => f.write_str(s),
        }
    }
}




#[derive(Clone, Debug, Default, PartialEq)]


/**
 * The conditions (and, where relevant, values) declared on each face for
 * one family of fields. Runtime parameter names are formed from a prefix
 * and the face: `xl_boundary_type`, `tyr_boundary_value`, and so on.
 */
pub struct FaceConditions {
    prefix: &'static str,
    conditions: [Option<BoundaryCondition>; 6],
    values: [Option<f64>; 6],
}




// ============================================================================
impl FaceConditions {

    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, ..Self::default() }
    }

    pub fn with(mut self, face: Face, condition: BoundaryCondition, value: Option<f64>) -> Self {
        self.conditions[face.slot()] = Some(condition);
        self.values[face.slot()] = value;
        self
    }


    /**
     * Read the conditions of every face from the snapshot's runtime
     * parameters. Faces without a declared parameter stay undeclared.
     */
    pub fn from_snapshot(snapshot: &Snapshot, prefix: &'static str) -> Self {
        let mut conditions = Self::new(prefix);
        let strings = snapshot.table_opt(STRING_RUNTIME_PARAMETERS);
        let reals = snapshot.table_opt(REAL_RUNTIME_PARAMETERS);

        for face in Face::ALL {
            let kind = conditions.parameter(face, "type");
            let value = conditions.parameter(face, "value");

            conditions.conditions[face.slot()] = strings
                .and_then(|t| t.get(&kind))
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse().ok());
            conditions.values[face.slot()] = reals
                .and_then(|t| t.get(&value))
                .and_then(|v| v.as_f64());
        }
        conditions
    }

    fn parameter(&self, face: Face, what: &str) -> String {
        let axis = face.axis().name();
        let side = if face.slot() % 2 == 0 { "l" } else { "r" };
        format!("{}{}{}_boundary_{}", self.prefix, axis, side, what)
    }

    pub fn condition(&self, face: Face) -> Result<&BoundaryCondition> {
        self.conditions[face.slot()].as_ref().ok_or_else(|| Error::MissingBoundary {
            face: face.name(),
            parameter: self.parameter(face, "type"),
        })
    }

    pub fn value(&self, face: Face) -> Result<f64> {
        self.values[face.slot()].ok_or_else(|| Error::MissingBoundary {
            face: face.name(),
            parameter: self.parameter(face, "value"),
        })
    }
}




#[derive(Clone, Debug, PartialEq)]


/**
 * Boundary conditions for the velocity (and pressure) family, and for
 * temperature.
 */
pub struct BoundaryConditions {
    pub velocity: FaceConditions,
    pub temperature: FaceConditions,
}

impl BoundaryConditions {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            velocity: FaceConditions::from_snapshot(snapshot, ""),
            temperature: FaceConditions::from_snapshot(snapshot, "t"),
        }
    }
}

impl Default for BoundaryConditions {
    fn default() -> Self {
        Self { velocity: FaceConditions::new(""), temperature: FaceConditions::new("t") }
    }
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]


/**
 * How a field's guard cells on the physical boundary are filled.
 */
pub enum FieldClass {
    /// A velocity component, face-centered (`fcx2`) or cell-centered (`velx`).
    Velocity { normal: Axis },
    Temperature,
    Pressure,
    GridCoordinate,
    GridMetric,
}

impl FieldClass {


    /**
     * Classify a field by name, or return `None` for fields with no
     * boundary rule.
     */
    pub fn of(name: &str) -> Option<Self> {
        match name.trim_end() {
            "fcx2" | "velx" => Some(FieldClass::Velocity { normal: Axis::X }),
            "fcy2" | "vely" => Some(FieldClass::Velocity { normal: Axis::Y }),
            "fcz2" | "velz" => Some(FieldClass::Velocity { normal: Axis::Z }),
            "temp" => Some(FieldClass::Temperature),
            "pres" => Some(FieldClass::Pressure),
            n if n.starts_with("xxx") || n.starts_with("yyy") || n.starts_with("zzz") => Some(FieldClass::GridCoordinate),
            n if n.starts_with("ddx") || n.starts_with("ddy") || n.starts_with("ddz") => Some(FieldClass::GridMetric),
            _ => None,
        }
    }
}




/**
 * Return the axis a field is staggered along, if it is one of the
 * face-centered velocity components of a checkpoint.
 */
pub fn stagger_of(name: &str) -> Option<Axis> {
    match name.trim_end() {
        "fcx2" => Some(Axis::X),
        "fcy2" => Some(Axis::Y),
        "fcz2" => Some(Axis::Z),
        _ => None,
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{stagger_of, BoundaryCondition, BoundaryConditions, FieldClass, FaceConditions};
    use crate::adjacency::Face;
    use crate::index_space::Axis;
    use crate::snapshot::Snapshot;

    #[test]
    fn conditions_parse_without_suffixes() {
        assert_eq!("noslip_ins".parse::<BoundaryCondition>(), Ok(BoundaryCondition::NoSlip));
        assert_eq!(" Dirichlet_HT ".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Dirichlet));
        assert_eq!("neumann".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Neumann));
        assert_eq!("reflect".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Other(String::from("reflect"))));
    }

    #[test]
    fn conditions_are_read_from_runtime_parameters() {
        let snapshot = Snapshot::new()
            .with_entry("string runtime parameters", "yr_boundary_type   ", "slip_ins")
            .with_entry("string runtime parameters", "txr_boundary_type", "dirichlet_ht")
            .with_entry("real runtime parameters", "txr_boundary_value", 2.5);
        let bc = BoundaryConditions::from_snapshot(&snapshot);
        assert_eq!(bc.velocity.condition(Face::Front).unwrap(), &BoundaryCondition::Slip);
        assert!(bc.velocity.condition(Face::Back).is_err());
        assert_eq!(bc.temperature.condition(Face::Right).unwrap(), &BoundaryCondition::Dirichlet);
        assert_eq!(bc.temperature.value(Face::Right).unwrap(), 2.5);
    }

    #[test]
    fn missing_parameters_name_the_runtime_parameter() {
        let err = FaceConditions::new("t").value(Face::Down).unwrap_err();
        assert!(err.to_string().contains("tzl_boundary_value"));
    }

    #[test]
    fn field_classes_follow_names() {
        assert_eq!(FieldClass::of("fcy2"), Some(FieldClass::Velocity { normal: Axis::Y }));
        assert_eq!(FieldClass::of("xxxc"), Some(FieldClass::GridCoordinate));
        assert_eq!(FieldClass::of("ddzr"), Some(FieldClass::GridMetric));
        assert_eq!(FieldClass::of("dens"), None);
    }

    #[test]
    fn only_face_centered_velocity_is_staggered() {
        assert_eq!(stagger_of("fcx2"), Some(Axis::X));
        assert_eq!(stagger_of("fcz2 "), Some(Axis::Z));
        assert_eq!(stagger_of("velx"), None);
        assert_eq!(stagger_of("pres"), None);
    }
}
