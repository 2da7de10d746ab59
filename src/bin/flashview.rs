use std::path::PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use log::{warn, LevelFilter};
use simple_logger::SimpleLogger;
use flashio::dataset::{DatasetOptions, SimulationDataset};
use flashio::names::FileNames;
use flashio::record::Format;
use flashio::snapshot::{Encoding, FileSource};




#[derive(Clone, Copy, Debug, ValueEnum)]
enum EncodingArg {
    Cbor,
    Msgpack,
}




#[derive(Debug, Parser)]
#[clap(version, about = "Summarize a sequence of simulation snapshots")]
struct Opts {
    /// Directory holding the snapshots
    #[clap(default_value = ".")]
    directory: PathBuf,

    #[clap(short, long, default_value = "")]
    basename: String,

    /// File name header; defaults to the one for the chosen form
    #[clap(long)]
    header: Option<String>,

    #[clap(long, default_value = "")]
    footer: String,

    #[clap(short, long, default_value = "")]
    extension: String,

    #[clap(short, long, default_value = "4")]
    width: usize,

    #[clap(short, long, default_value = "0")]
    first: usize,

    /// Last file number, inclusive; defaults to the first
    #[clap(short, long)]
    last: Option<usize>,

    #[clap(short, long, default_value = "1")]
    step: usize,

    /// Companion grid file number, for stretched grids
    #[clap(short, long)]
    grid: Option<usize>,

    #[clap(long, default_value = "flash")]
    code: String,

    #[clap(long, default_value = "plt")]
    form: String,

    /// Explicit snapshot paths, read instead of the numbered range
    #[clap(long = "file")]
    files: Vec<PathBuf>,

    /// Encoding of every file; guessed from the extension when absent
    #[clap(long, value_enum)]
    encoding: Option<EncodingArg>,

    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}




// ============================================================================
impl Opts {
    fn file_names(&self, format: Format) -> FileNames {
        let defaults = FileNames::for_form(format.form);
        FileNames {
            directory: self.directory.clone(),
            basename: self.basename.clone(),
            header: self.header.clone().unwrap_or(defaults.header),
            footer: self.footer.clone(),
            extension: self.extension.clone(),
            width: self.width,
            grid_number: self.grid.unwrap_or(0),
        }
    }

    fn source(&self) -> FileSource {
        match self.encoding {
            Some(EncodingArg::Cbor) => FileSource::with_encoding(Encoding::Cbor),
            Some(EncodingArg::Msgpack) => FileSource::with_encoding(Encoding::MessagePack),
            None => FileSource::new(),
        }
    }

    fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    SimpleLogger::new().with_level(opts.level()).init()?;

    let format = Format::parse(&opts.code, &opts.form)?;
    let names = opts.file_names(format);
    let last = opts.last.unwrap_or(opts.first);

    if last < opts.first {
        warn!("last file number {} precedes the first, {}", last, opts.first);
    }
    let options = DatasetOptions {
        code: opts.code.clone(),
        form: opts.form.clone(),
        grid_file: opts.grid.map(|_| names.grid_path()),
        ..DatasetOptions::default()
    };
    let dataset = if opts.files.is_empty() {
        let numbers = (opts.first..=last).step_by(opts.step.max(1));
        SimulationDataset::from_names(&opts.source(), &names, numbers, options)?
    } else {
        SimulationDataset::open(&opts.source(), &opts.files, options)?
    };
    let geometry = dataset.geometry();

    println!("{} {:?} snapshots", dataset.len(), dataset.format().form);
    println!("grid .................. {}", geometry.grid());
    println!("dimensions ............ {}", geometry.dim());
    println!("blocks ................ {}", geometry.blocks());
    println!("cells per block ....... {:?}", geometry.cells());
    println!("times ................. {:?}", dataset.fields().keys().collect::<Vec<_>>());

    if let Some(fields) = dataset.fields().last() {
        println!();
        for name in fields.names() {
            if let Some(extrema) = fields.extrema(name)? {
                println!("{:<8} min {:>14.6e}  max {:>14.6e}", name, extrema.min, extrema.max);
            }
        }
    }
    Ok(())
}
