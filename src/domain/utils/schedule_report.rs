use std::fs::File;
use std::io::Write;

use crate::domain::scheduler::site_selector::ScheduleSummary;
use crate::error::Result;

const HEADERS: [&str; 4] = ["Job", "Site", "Start", "Finish"];

/// Writes the schedule as `;` separated CSV, one row per job plus a closing makespan row.
pub fn write_schedule_report<W: Write>(summary: &ScheduleSummary, writer: W) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    csv_wtr.write_record(HEADERS)?;
    for entry in &summary.entries {
        csv_wtr.write_record([entry.job.as_str(), entry.site.as_str(), &entry.start.to_string(), &entry.finish.to_string()])?;
    }
    csv_wtr.write_record(["Makespan", "", "", &summary.makespan.to_string()])?;

    csv_wtr.flush()?;
    Ok(())
}

pub fn write_schedule_report_file(summary: &ScheduleSummary, file_path: &str) -> Result<()> {
    let file = File::create(file_path)?;
    write_schedule_report(summary, file)?;
    log::info!("Schedule report written to '{}'.", file_path);
    Ok(())
}
