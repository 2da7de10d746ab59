use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::record::Form;




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]


/**
 * Builds snapshot file paths of the form
 * `directory/basename + header + number + footer + extension`, with the
 * number zero-padded to `width` digits.
 */
pub struct FileNames {
    pub directory: PathBuf,
    pub basename: String,
    pub header: String,
    pub footer: String,
    pub extension: String,
    pub width: usize,
    /// The number of the companion grid file of stretched runs.
    pub grid_number: usize,
}

impl Default for FileNames {
    fn default() -> Self {
        Self::for_form(Form::Plot)
    }
}




// ============================================================================
impl FileNames {

    pub fn for_form(form: Form) -> Self {
        let header = match form {
            Form::Plot => "hdf5_plt_cnt_",
            Form::Checkpoint => "hdf5_chk_",
        };
        Self {
            directory: PathBuf::new(),
            basename: String::new(),
            header: header.to_string(),
            footer: String::new(),
            extension: String::new(),
            width: 4,
            grid_number: 0,
        }
    }

    pub fn path(&self, number: usize) -> PathBuf {
        self.directory.join(format!(
            "{}{}{:0width$}{}{}",
            self.basename,
            self.header,
            number,
            self.footer,
            self.extension,
            width = self.width))
    }

    pub fn paths<I: IntoIterator<Item = usize>>(&self, numbers: I) -> Vec<PathBuf> {
        numbers.into_iter().map(|n| self.path(n)).collect()
    }

    pub fn grid_path(&self) -> PathBuf {
        self.directory.join(format!("{}hdf5_grd_{:0width$}", self.basename, self.grid_number, width = self.width))
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use std::path::PathBuf;
    use super::FileNames;
    use crate::record::Form;

    #[test]
    fn paths_are_zero_padded() {
        let names = FileNames {
            directory: PathBuf::from("../out"),
            basename: String::from("INS_LidDr_Cavity_"),
            ..FileNames::default()
        };
        assert_eq!(names.path(2), PathBuf::from("../out/INS_LidDr_Cavity_hdf5_plt_cnt_0002"));
        assert_eq!(names.paths(0..3).len(), 3);
        assert_eq!(names.grid_path(), PathBuf::from("../out/INS_LidDr_Cavity_hdf5_grd_0000"));
    }

    #[test]
    fn checkpoints_use_their_own_header() {
        let names = FileNames { extension: String::from(".cbor"), width: 2, ..FileNames::for_form(Form::Checkpoint) };
        assert_eq!(names.path(7), PathBuf::from("hdf5_chk_07.cbor"));
    }
}
