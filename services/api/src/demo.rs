use crate::infra::{in_memory_board, MemoryBoardService};
use clap::Args;
use jobboard::board::{
    BoardError, Caller, CompanyInput, JobInput, RequirementsInput, StatusDecision,
};
use jobboard::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of students applying to the demo posting.
    #[arg(long, default_value_t = 2)]
    pub(crate) applicants: usize,
    /// Stop after the guarded delete instead of force-deleting the posting.
    #[arg(long)]
    pub(crate) keep_job: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            applicants: 2,
            keep_job: false,
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Job board lifecycle demo");
    for line in demo_transcript(&in_memory_board(), &args)? {
        println!("{line}");
    }
    Ok(())
}

/// Walks one posting through applications, decisions and deletion. Expected refusals
/// are reported in the transcript; anything else aborts the demo.
pub(crate) fn demo_transcript(
    service: &MemoryBoardService,
    args: &DemoArgs,
) -> Result<Vec<String>, AppError> {
    let mut lines = Vec::new();
    let recruiter = Caller::recruiter("demo-recruiter");
    let students: Vec<Caller> = (1..=args.applicants.max(1))
        .map(|index| Caller::student(format!("demo-student-{index}")))
        .collect();

    let company = service.register_company(
        &recruiter,
        CompanyInput {
            name: "Demo Works".to_string(),
            description: Some("Sample employer".to_string()),
            website: None,
            location: Some("Remote".to_string()),
        },
    )?;
    lines.push(format!("  company registered: {} ({})", company.name, company.id));

    let job = service.post_job(
        &recruiter,
        JobInput {
            title: "Junior Rust Developer".to_string(),
            description: "Maintain the job board service".to_string(),
            requirements: RequirementsInput::Delimited("Rust, HTTP, SQL".to_string()),
            salary: 9.5,
            experience_years: 1,
            location: "Remote".to_string(),
            job_type: "Full Time".to_string(),
            positions: 1,
            company_id: company.id.clone(),
        },
    )?;
    lines.push(format!(
        "  job posted: {} '{}' requiring {}",
        job.id,
        job.title,
        job.requirements
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let mut applications = Vec::with_capacity(students.len());
    for student in &students {
        let application = service.apply(student, &job.id)?;
        lines.push(format!(
            "  {} applied: {} [{}]",
            student.user_id, application.id, application.status
        ));
        applications.push(application);
    }

    let accepted = service.set_status(
        &applications[0].id,
        &recruiter.user_id,
        StatusDecision::Accepted,
    )?;
    lines.push(format!("  {} -> {}", accepted.id, accepted.status));
    lines.push(refusal(
        "second decision",
        service.set_status(
            &applications[0].id,
            &recruiter.user_id,
            StatusDecision::Rejected,
        ),
    )?);

    lines.push(refusal(
        "duplicate application",
        service.apply(&students[0], &job.id),
    )?);

    for application in applications.iter().skip(1) {
        let rejected =
            service.set_status(&application.id, &recruiter.user_id, StatusDecision::Rejected)?;
        lines.push(format!("  {} -> {}", rejected.id, rejected.status));
    }

    let detail = service.job_detail(&job.id, &students[0])?;
    lines.push(format!(
        "  {} applicant(s) on record for {}",
        detail.applicant_count, job.id
    ));

    lines.push(refusal(
        "guarded delete",
        service.delete_job(&job.id, &recruiter.user_id, false),
    )?);

    if !args.keep_job {
        let receipt = service.delete_job(&job.id, &recruiter.user_id, true)?;
        lines.push(format!(
            "  forced delete removed {} and {} application(s)",
            receipt.job_id, receipt.removed_applications
        ));
        lines.push(format!(
            "  remaining jobs: {}",
            service.list_jobs(None)?.len()
        ));
    }

    Ok(lines)
}

fn refusal<T>(step: &str, outcome: Result<T, BoardError>) -> Result<String, AppError> {
    match outcome {
        Err(err @ BoardError::Conflict(_)) => Ok(format!("  {step} refused: {err}")),
        Err(err) => Err(err.into()),
        Ok(_) => Ok(format!("  {step} unexpectedly succeeded")),
    }
}
