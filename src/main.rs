use anyhow::Context;
use clap::Parser;

use workflow_planner::domain::utils::schedule_report::write_schedule_report_file;
use workflow_planner::{PlannerInputs, logger, plan_workflow};

/// Maps an abstract workflow onto execution sites and prints the refined workflow.
#[derive(Parser, Debug)]
#[command(name = "workflow-planner", version, about)]
struct Args {
    /// Workflow description (JSON)
    #[arg(long)]
    workflow: String,

    /// Site catalog (JSON)
    #[arg(long)]
    sites: String,

    /// Replica catalog (JSON)
    #[arg(long)]
    replicas: Option<String>,

    /// Transformation catalog (JSON)
    #[arg(long)]
    transformations: Option<String>,

    /// Planner options (JSON)
    #[arg(long)]
    options: Option<String>,

    /// Write the computed schedule as CSV to this file
    #[arg(long)]
    schedule_report: Option<String>,

    #[arg(long, default_value = "logs")]
    log_dir: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(&args.log_dir);

    let inputs = PlannerInputs {
        workflow: args.workflow.clone(),
        sites: args.sites,
        replicas: args.replicas,
        transformations: args.transformations,
        options: args.options,
    };

    let planned = plan_workflow(&inputs).with_context(|| format!("Planning '{}' failed", args.workflow))?;

    planned.workflow.print_summary();
    if let Some(cleanup) = &planned.cleanup_workflow {
        cleanup.print_summary();
    }
    if !planned.deleted_jobs.is_empty() {
        log::info!("Reused results of {} jobs.", planned.deleted_jobs.len());
    }
    log::info!("Makespan: {}", planned.schedule.makespan);

    if let Some(report_path) = &args.schedule_report {
        write_schedule_report_file(&planned.schedule, report_path)?;
    }
    Ok(())
}
