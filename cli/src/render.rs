//! Console output for the shell.

use colored::{ColoredString, Colorize};
use joblib::{JobError, JobId, JobReport, JobStatus};
use std::io::{self, Write};

pub fn banner(out: &mut impl Write) -> io::Result<()> {
    let rule = "===========================================";
    writeln!(out, "{}", rule.cyan())?;
    writeln!(out, "{}", "      CONCURRENT JOBS CLIENT".cyan())?;
    writeln!(out, "{}", rule.cyan())
}

pub fn menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nMAIN MENU")?;
    writeln!(out, "1. Start a new job")?;
    writeln!(out, "2. Check job status")?;
    writeln!(out, "3. Cancel a job")?;
    writeln!(out, "4. Monitor a job (real-time updates)")?;
    writeln!(out, "5. List active jobs")?;
    writeln!(out, "0. Exit")
}

pub fn status(status: &JobStatus) -> ColoredString {
    match status {
        JobStatus::Running => status.as_str().yellow(),
        JobStatus::Completed => status.as_str().green(),
        JobStatus::Cancelled => status.as_str().bright_red(),
        JobStatus::Failed => status.as_str().red(),
        JobStatus::Other(_) => status.as_str().normal(),
    }
}

pub fn job_details(out: &mut impl Write, report: &JobReport) -> io::Result<()> {
    writeln!(out, "\nJob Details:")?;
    writeln!(out, "ID: {}", report.descriptor.job_id)?;
    writeln!(out, "Type: {}", report.descriptor.job_type)?;
    writeln!(out, "Name: {}", report.descriptor.job_name)?;
    writeln!(out, "Status: {}", status(&report.status))
}

pub fn monitor_update(out: &mut impl Write, report: &JobReport) -> io::Result<()> {
    writeln!(
        out,
        "Job {} is {}",
        report.descriptor.job_id,
        status(&report.status)
    )
}

pub fn job_table<'a>(
    out: &mut impl Write,
    rows: impl IntoIterator<Item = (JobId, &'a Result<JobStatus, JobError>)>,
) -> io::Result<()> {
    writeln!(out, "Job ID                               | Status")?;
    writeln!(out, "-------------------------------------|---------------")?;
    for (job_id, row) in rows {
        match row {
            Ok(job_status) => writeln!(out, "{} | {}", job_id, status(job_status))?,
            Err(_) => writeln!(out, "{} | Error: could not retrieve status", job_id)?,
        }
    }
    Ok(())
}

pub fn success(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.green())
}

pub fn warning(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message.yellow())
}

pub fn error(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", format!("ERROR: {}", message).red())
}
