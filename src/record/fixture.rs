//! In-memory snapshots of a small two-dimensional run: two 4 x 2 blocks
//! side by side along x, covering the unit squares [0, 1] and [1, 2].

use crate::array::DenseArray;
use crate::snapshot::Snapshot;




pub(crate) fn snapshot(setup: &str, time: f64) -> Snapshot {
    let coordinates = DenseArray::new(vec![2, 3], vec![0.5, 0.5, 0.0, 1.5, 0.5, 0.0]).unwrap();
    let bounding_box = DenseArray::new(vec![2, 3, 2], vec![
        0.0, 1.0, 0.0, 1.0, 0.0, 0.0,
        1.0, 2.0, 0.0, 1.0, 0.0, 0.0,
    ]).unwrap();

    Snapshot::new()
        .with_entry("real scalars", "time", time)
        .with_entry("real scalars", "dt", 0.5)
        .with_entry("integer scalars", "nstep", (time * 10.0) as i64)
        .with_entry("integer scalars", "nbegin", 1)
        .with_entry("integer scalars", "dimensionality", 2)
        .with_entry("integer scalars", "globalnumblocks", 2)
        .with_entry("integer scalars", "nxb", 4)
        .with_entry("integer scalars", "nyb", 2)
        .with_entry("integer scalars", "nzb", 1)
        .with_entry("logical scalars", "restart", false)
        .with_entry("string scalars", "run comment", "two blocks   ")
        .with_entry("integer runtime parameters", "iprocs", 2)
        .with_entry("integer runtime parameters", "jprocs", 1)
        .with_entry("integer runtime parameters", "kprocs", 1)
        .with_entry("integer runtime parameters", "nblockx", 2)
        .with_entry("integer runtime parameters", "nblocky", 1)
        .with_entry("integer runtime parameters", "nblockz", 1)
        .with_entry("logical runtime parameters", "useheat", true)
        .with_entry("real runtime parameters", "xmin", 0.0)
        .with_entry("real runtime parameters", "xmax", 2.0)
        .with_entry("real runtime parameters", "ymin", 0.0)
        .with_entry("real runtime parameters", "ymax", 1.0)
        .with_entry("real runtime parameters", "zmin", 0.0)
        .with_entry("real runtime parameters", "zmax", 0.0)
        .with_entry("real runtime parameters", "txl_boundary_value", 0.0)
        .with_entry("real runtime parameters", "txr_boundary_value", 1.0)
        .with_entry("real runtime parameters", "tyl_boundary_value", 0.0)
        .with_entry("real runtime parameters", "tyr_boundary_value", 0.0)
        .with_entry("string runtime parameters", "xl_boundary_type", "noslip_ins")
        .with_entry("string runtime parameters", "xr_boundary_type", "noslip_ins")
        .with_entry("string runtime parameters", "yl_boundary_type", "noslip_ins")
        .with_entry("string runtime parameters", "yr_boundary_type", "movlid_ins")
        .with_entry("string runtime parameters", "txl_boundary_type", "dirichlet_ht")
        .with_entry("string runtime parameters", "txr_boundary_type", "dirichlet_ht")
        .with_entry("string runtime parameters", "tyl_boundary_type", "neumann_ht")
        .with_entry("string runtime parameters", "tyr_boundary_type", "neumann_ht")
        .with_entry("sim info", "9", setup)
        .with_dataset("coordinates", coordinates)
        .with_dataset("bounding box", bounding_box)
        .with_tree(vec![
            vec![-35, 1, -35, -35, -1, -1, -1, -1, -1],
            vec![0, -35, -35, -35, -1, -1, -1, -1, -1],
        ])
        .with_unknown_names(["dens", "temp", "pres"])
        .with_dataset("dens", cell_data(time))
        .with_dataset("temp", cell_data(0.0))
        .with_dataset("pres", cell_data(1.0))
        .with_dataset("fcx2", face_data(vec![2, 1, 2, 5]))
        .with_dataset("fcy2", face_data(vec![2, 1, 3, 4]))
}


/**
 * A cell-centered field equal to `base + 100 b + 10 j + i` in block `b`.
 */
pub(crate) fn cell_data(base: f64) -> DenseArray {
    DenseArray::from_function(vec![2, 1, 2, 4], |i| base + (100 * i[0] + 10 * i[2] + i[3]) as f64)
}


/**
 * A face-centered field of the given raw shape, equal to
 * `1 + 100 b + 10 j + i` at raw face `(j, i)` of block `b`.
 */
pub(crate) fn face_data(shape: Vec<usize>) -> DenseArray {
    DenseArray::from_function(shape, |i| 1.0 + (100 * i[0] + 10 * i[2] + i[3]) as f64)
}


/**
 * The companion grid snapshot of a stretched run: coordinates and metrics
 * of the same two blocks, stored without guard cells.
 */
pub(crate) fn grid_snapshot() -> Snapshot {
    let mut grid = Snapshot::new();

    for (axis, (coordinate, metric)) in [("xxx", "ddx"), ("yyy", "ddy"), ("zzz", "ddz")].iter().enumerate() {
        for (shift, suffix) in [(-0.5, "l"), (0.0, "c"), (0.5, "r")] {
            let mesh = DenseArray::from_function(vec![2, 1, 2, 4], |i| match axis {
                0 => i[0] as f64 + (i[3] as f64 + 0.5 + shift) * 0.25,
                1 => (i[2] as f64 + 0.5 + shift) * 0.5,
                _ => 0.0,
            });
            let ddx = DenseArray::from_function(vec![2, 1, 2, 4], |_| [4.0, 2.0, 0.0][axis]);
            grid = grid
                .with_dataset(&format!("{}{}", coordinate, suffix), mesh)
                .with_dataset(&format!("{}{}", metric, suffix), ddx);
        }
    }
    grid
}
