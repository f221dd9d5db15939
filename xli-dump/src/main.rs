use std::{fs, path::PathBuf};

use pico_args::Arguments;
use sierra_ecg::{
    Conditioner, ConditioningConfig, LeadSet,
    conditioning::{Bandpass, Passthrough},
};

const HELP: &str = "\
Decode the XLI waveform section of a Philips Sierra ECG XML file

USAGE:
  xli-dump [OPTIONS] <FILE>

FILE holds the base64 text of the waveform element.

OPTIONS:
  --raw                 FILE holds the already decoded binary section
  --no-filter           Skip bandpass filtering, only normalize
  --sampling-rate HZ    Sampling rate of the recording [default: 500]
  -h, --help            Print this help
";

struct Args {
    path: PathBuf,
    raw: bool,
    no_filter: bool,
    sampling_rate: Option<f64>,
}

fn parse_args() -> eyre::Result<Option<Args>> {
    let mut args = Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(None);
    }
    let args = Args {
        raw: args.contains("--raw"),
        no_filter: args.contains("--no-filter"),
        sampling_rate: args.opt_value_from_str("--sampling-rate")?,
        path: args.free_from_str()?,
    };
    Ok(Some(args))
}

fn print_leads(leads: &LeadSet) {
    for (lead, samples) in leads.iter() {
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        println!("{lead}\t{}\t{min:.4}\t{max:.4}", samples.len());
    }
}

fn run<F: Bandpass>(section: &[u8], conditioner: &Conditioner<F>) -> eyre::Result<()> {
    let leads = sierra_ecg::process(section, conditioner)?;
    println!("lead\tsamples\tmin\tmax");
    print_leads(&leads);
    Ok(())
}

fn main() -> eyre::Result<()> {
    env_logger::init();

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let section = if args.raw {
        fs::read(&args.path)?
    } else {
        sierra_ecg::decode_base64(&fs::read_to_string(&args.path)?)?
    };
    log::info!("{}: {} byte waveform section", args.path.display(), section.len());

    let mut config = ConditioningConfig::default();
    if let Some(rate) = args.sampling_rate {
        config = config.with_sampling_rate(rate);
    }

    if args.no_filter {
        run(&section, &Conditioner::with_filter(Passthrough, config.epsilon))
    } else {
        run(&section, &Conditioner::new(&config)?)
    }
}
