use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hepplot::job::Job;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML job describing processes, styles and figures
    #[arg(value_name = "JOB")]
    job: PathBuf,

    /// Luminosity in fb^-1, replacing the job's value
    #[arg(short, long, value_name = "LUMI")]
    luminosity: Option<f64>,

    /// Output subdirectory, replacing the job's value
    #[arg(short, long, value_name = "SUBDIR")]
    subdir: Option<String>,

    /// Hide the progress bar and per-process timing
    #[arg(long)]
    min_print: bool,
}

impl Args {
    fn apply(&self, job: &mut Job) {
        if let Some(luminosity) = self.luminosity {
            job.luminosity = luminosity;
        }
        if let Some(subdir) = &self.subdir {
            job.subdir.clone_from(subdir);
        }
        job.min_print |= self.min_print;
    }
}

fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args = Args::parse();
    let result = Job::load(&args.job).and_then(|mut job| {
        args.apply(&mut job);
        job.run()
    });

    match result {
        Ok(written) => {
            log::info!("{}: wrote {} files", args.job.display(), written.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}: {err}", args.job.display());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn overrides_apply_to_job() {
        let args = Args::try_parse_from(["hepplot", "zg.yaml", "-l", "138", "--subdir", "zg_v2"]).unwrap();
        assert_eq!(args.job, PathBuf::from("zg.yaml"));

        let mut job: Job = serde_yaml::from_str("processes: []\nsubdir: zg\n").unwrap();
        args.apply(&mut job);
        assert_eq!(job.luminosity, 138.0);
        assert_eq!(job.subdir, "zg_v2");
        assert!(!job.min_print);
    }

    #[test]
    fn help_and_missing_job_are_not_paths() {
        let help = Args::try_parse_from(["hepplot", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(Args::try_parse_from(["hepplot"]).is_err());
        assert!(Args::try_parse_from(["hepplot", "a.yaml", "b.yaml"]).is_err());
    }
}
