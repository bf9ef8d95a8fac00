//! Command dispatch: confirmation prompts, background jobs and outcome messages.

use crate::config::AppConfig;
use crate::workflow::{self, Outcome, PlotOptions};
use crate::{server, Command};
use anyhow::Result;
use luxmap_core::{organizer::OrganizeReport, worker::Worker};
use luxmap_schemas::{
    measurement::{MeasurementTable, ZField},
    surface::InterpolationMethod,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Results handed back by background jobs.
enum JobOutput {
    Organized(PathBuf, Result<(OrganizeReport, Outcome)>),
    Extracted(PathBuf, Result<Vec<(PathBuf, MeasurementTable)>>),
}

pub struct Shell {
    config: AppConfig,
    z_field: ZField,
    assume_yes: bool,
    worker: Worker<JobOutput>,
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` declines.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

impl Shell {
    pub fn new(config: AppConfig, z_field: ZField, assume_yes: bool) -> Self {
        Self {
            config,
            z_field,
            assume_yes,
            worker: Worker::new(),
        }
    }

    fn options(&self, method: Option<InterpolationMethod>) -> PlotOptions {
        PlotOptions {
            z_field: self.z_field,
            method: method.unwrap_or(self.config.interpolation),
        }
    }

    fn confirmed(&self, question: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let stdin = io::stdin();
        let mut input = stdin.lock();
        Ok(confirm(&mut input, &mut io::stdout(), question)?)
    }

    pub fn run(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Organize { dir } => {
                if !self.confirmed(&format!("Organize the files in {:?} into label folders?", dir))? {
                    return Ok(Outcome::NothingToDo("Organization cancelled".to_string()));
                }
                self.run_in_background("organize", move || {
                    let result = workflow::organize(&dir);
                    JobOutput::Organized(dir, result)
                })
            }
            Command::Extract { root } => {
                if !self.confirmed(&format!("Extract and save the tables of every folder in {:?}?", root))? {
                    return Ok(Outcome::NothingToDo("Extraction cancelled".to_string()));
                }
                self.run_in_background("extract", move || {
                    let result = workflow::extract_all(&root);
                    JobOutput::Extracted(root, result)
                })
            }
            Command::Scatter { dir } => workflow::scatter(&dir, self.options(None), &self.config),
            Command::Surface { dir, method } => workflow::surface(&dir, self.options(method), &self.config),
            Command::MultiSurface { root, method } => {
                workflow::multi_surface(&root, self.options(method), &self.config)
            }
            Command::Spectral { root } => workflow::spectral(&root, &self.config),
            Command::SpectralPanels { root } => workflow::spectral_panels(&root, &self.config),
            Command::Serve { addr } => {
                let addr = addr.unwrap_or_else(|| self.config.server.addr.clone());
                server::run(&addr, self.config.png_size)?;
                Ok(Outcome::Done(Vec::new()))
            }
        }
    }

    fn run_in_background<F>(&mut self, name: &str, job: F) -> Result<Outcome>
    where
        F: FnOnce() -> JobOutput + Send + 'static,
    {
        self.worker.submit(name, job)?;
        println!("Running {} in the background...", name);
        loop {
            match self.worker.wait_timeout(Duration::from_secs(2))? {
                Some(done) => return on_complete(done.result),
                None => log::info!("'{}' still running", name),
            }
        }
    }
}

/// Completion handler, run on the foreground thread.
fn on_complete(output: JobOutput) -> Result<Outcome> {
    match output {
        JobOutput::Organized(dir, result) => {
            let (report, outcome) = result?;
            workflow::print_organize_report(&dir, &report);
            Ok(outcome)
        }
        JobOutput::Extracted(root, result) => {
            let tables = result?;
            for (dir, table) in &tables {
                workflow::print_table(dir, table);
            }
            Ok(workflow::extraction_outcome(&root, &tables))
        }
    }
}

/// Prints the user-facing line for a finished command.
pub fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Done(paths) => {
            println!("\nDone.");
            for path in paths {
                println!("  wrote {}", path.display());
            }
        }
        Outcome::NothingToDo(reason) => println!("\nWarning: {}", reason),
    }
}

/// Formats an error chain for the user.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("\nError: {:#}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn confirmation_accepts_only_yes() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false), ("", false)] {
            let mut out = Vec::new();
            let got = confirm(&mut answer.as_bytes(), &mut out, "Proceed?").unwrap();
            assert_eq!(got, expected, "answer {:?}", answer);
            assert_eq!(String::from_utf8(out).unwrap(), "Proceed? [y/N] ");
        }
    }

    #[test]
    fn organize_runs_through_the_worker() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a100A.txt"), "x").unwrap();
        let mut shell = Shell::new(AppConfig::default(), ZField::Ppfd, true);

        let outcome = shell
            .run(Command::Organize {
                dir: dir.path().to_path_buf(),
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Done(Vec::new()));
        assert!(dir.path().join("100A").join("a100A.txt").is_file());

        let again = shell
            .run(Command::Organize {
                dir: dir.path().to_path_buf(),
            })
            .unwrap();
        assert!(matches!(again, Outcome::NothingToDo(_)));
    }

    #[test]
    fn extraction_errors_surface_from_the_worker() {
        let dir = tempdir().unwrap();
        let mut shell = Shell::new(AppConfig::default(), ZField::Ppfd, true);
        let err = shell
            .run(Command::Extract {
                root: dir.path().join("missing"),
            })
            .unwrap_err();
        assert!(format!("{:#}", err).contains("missing"));
    }
}
