use crate::infra::{build_service, DemoUnderwritingService};
use clap::Args;
use credit_ai::config::AppConfig;
use credit_ai::error::AppError;
use credit_ai::workflows::underwriting::{
    ApplicantRecord, ApplicationCsvImporter, ApplicationForm, AssessmentError, Decision,
    DecisionEngine, EmploymentStatus, FeatureContribution, HomeOwnership, ImportedApplication,
    LoanPurpose, PredictiveAssessment, RiskAppetite, UnderwritingServiceError, Verdict,
};
use credit_ai::workflows::underwriting::evaluation::MAX_SCORE;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    #[arg(long)]
    pub(crate) age: u16,
    #[arg(long)]
    pub(crate) annual_income: f64,
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Annual percentage rate, e.g. 10.5
    #[arg(long)]
    pub(crate) interest_rate: f64,
    #[arg(long)]
    pub(crate) credit_history_years: f64,
    #[arg(long, default_value_t = 0)]
    pub(crate) prior_defaults: u16,
    #[arg(long)]
    pub(crate) employment_status: String,
    #[arg(long)]
    pub(crate) home_ownership: String,
    #[arg(long)]
    pub(crate) loan_purpose: String,
    /// Risk appetite (defaults to UNDERWRITING_DEFAULT_APPETITE)
    #[arg(long)]
    pub(crate) appetite: Option<String>,
    /// Use this default probability instead of the reference scorer
    #[arg(long)]
    pub(crate) probability: Option<f64>,
    /// Print the verdict as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl AssessArgs {
    fn form(&self) -> ApplicationForm {
        ApplicationForm {
            age: Some(self.age),
            annual_income: Some(self.annual_income),
            loan_amount: Some(self.loan_amount),
            interest_rate: Some(self.interest_rate),
            credit_history_years: Some(self.credit_history_years),
            prior_defaults: Some(self.prior_defaults),
            employment_status: Some(self.employment_status.clone()),
            home_ownership: Some(self.home_ownership.clone()),
            loan_purpose: Some(self.loan_purpose.clone()),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one application per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Risk appetite applied to every row
    #[arg(long)]
    pub(crate) appetite: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the full rationale for each scenario
    #[arg(long)]
    pub(crate) verbose: bool,
}

fn load_service() -> Result<(DemoUnderwritingService, RiskAppetite), AppError> {
    let config = AppConfig::load()?;
    let engine = Arc::new(DecisionEngine::new(config.underwriting.engine)?);
    let (service, _) = build_service(engine);
    Ok((service, config.underwriting.default_appetite))
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let (service, default_appetite) = load_service()?;
    let appetite = args
        .appetite
        .clone()
        .unwrap_or_else(|| default_appetite.label().to_string());

    let (assessment_id, verdict) = match args.probability {
        Some(probability) => {
            let predictive = PredictiveAssessment::new(probability);
            let verdict = service.assess_with(args.form(), &appetite, &predictive)?;
            (None, verdict)
        }
        None => {
            let record = service.submit(args.form(), &appetite)?;
            (Some(record.assessment_id.0), record.verdict)
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&verdict) {
            Ok(payload) => println!("{payload}"),
            Err(err) => eprintln!("failed to serialize verdict: {err}"),
        }
        return Ok(());
    }

    if let Some(id) = assessment_id {
        println!("Assessment {id} (reference scorer)");
    } else {
        println!("Assessment with supplied probability");
    }
    render_verdict(&verdict, true);
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let (service, default_appetite) = load_service()?;
    let appetite = args
        .appetite
        .unwrap_or_else(|| default_appetite.label().to_string());
    let rows = ApplicationCsvImporter::from_path(&args.csv)?;

    println!(
        "Batch assessment of {} application(s) from {} at {} appetite",
        rows.len(),
        args.csv.display(),
        appetite
    );

    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    for row in rows {
        let reference = row.reference.clone();
        match assess_row(&service, row, &appetite) {
            Ok(verdict) => {
                *tally.entry(verdict.decision.label()).or_default() += 1;
                println!("- {}: {}", reference, verdict.summary());
            }
            Err(err) => {
                *tally.entry("ERROR").or_default() += 1;
                println!("- {}: not assessed ({err})", reference);
            }
        }
    }

    println!("\nOutcomes");
    for (label, count) in tally {
        println!("- {label}: {count}");
    }
    Ok(())
}

/// Rows without a probability column go to the reference scorer. Rows with an
/// unparsable cell are rejected before any scoring.
fn assess_row(
    service: &DemoUnderwritingService,
    row: ImportedApplication,
    appetite: &str,
) -> Result<Verdict, UnderwritingServiceError> {
    if let Some(err) = row.malformed {
        return Err(AssessmentError::from(err).into());
    }
    match &row.predictive {
        Some(predictive) => service.assess_with(row.form, appetite, predictive),
        None => service.submit(row.form, appetite).map(|record| record.verdict),
    }
}

struct Scenario {
    title: &'static str,
    record: ApplicantRecord,
    appetite: RiskAppetite,
    probability: f64,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            title: "Established borrower, methods agree",
            record: ApplicantRecord {
                age: 38,
                annual_income: 72_000.0,
                loan_amount: 18_000.0,
                interest_rate: 10.5,
                credit_history_years: 8.0,
                prior_defaults: 0,
                employment_status: EmploymentStatus::FullTime,
                home_ownership: HomeOwnership::Mortgage,
                loan_purpose: LoanPurpose::HomeImprovement,
            },
            appetite: RiskAppetite::Balanced,
            probability: 0.185,
        },
        Scenario {
            title: "Repeat defaulter with extreme model risk",
            record: ApplicantRecord {
                age: 27,
                annual_income: 35_000.0,
                loan_amount: 20_000.0,
                interest_rate: 19.5,
                credit_history_years: 3.0,
                prior_defaults: 3,
                employment_status: EmploymentStatus::PartTime,
                home_ownership: HomeOwnership::Rent,
                loan_purpose: LoanPurpose::Personal,
            },
            appetite: RiskAppetite::Balanced,
            probability: 0.60,
        },
        Scenario {
            title: "Strong file, cautious appetite, model disagrees",
            record: ApplicantRecord {
                age: 38,
                annual_income: 72_000.0,
                loan_amount: 18_000.0,
                interest_rate: 10.5,
                credit_history_years: 8.0,
                prior_defaults: 0,
                employment_status: EmploymentStatus::FullTime,
                home_ownership: HomeOwnership::Mortgage,
                loan_purpose: LoanPurpose::HomeImprovement,
            },
            appetite: RiskAppetite::Conservative,
            probability: 0.30,
        },
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let (service, _) = load_service()?;

    println!("Dual-assessment underwriting demo");
    let thresholds = service.engine().config().thresholds.entries();
    let table: Vec<String> = thresholds
        .iter()
        .map(|(appetite, threshold)| format!("{appetite} {threshold:.2}"))
        .collect();
    println!("Thresholds: {}", table.join(" | "));

    for scenario in scenarios() {
        println!(
            "\n{} ({} appetite, model probability {:.3})",
            scenario.title, scenario.appetite, scenario.probability
        );
        let predictive = PredictiveAssessment {
            probability: scenario.probability,
            top_factors: Vec::new(),
        };
        let verdict = service.assess_with(
            ApplicationForm::from(&scenario.record),
            scenario.appetite.label(),
            &predictive,
        )?;
        render_verdict(&verdict, args.verbose);
    }

    println!("\nReference scorer walk-through");
    let walkthrough = scenarios();
    let scenario = &walkthrough[0];
    let record = service.submit(
        ApplicationForm::from(&scenario.record),
        scenario.appetite.label(),
    )?;
    println!("Assessment {}", record.assessment_id.0);
    render_verdict(&record.verdict, args.verbose);

    let queue = service.review_queue(10)?;
    println!("\nManual review queue: {} assessment(s)", queue.len());
    Ok(())
}

pub(crate) fn render_verdict(verdict: &Verdict, show_rationale: bool) {
    println!("Decision: {} (grade {})", verdict.decision, verdict.grade);
    println!(
        "Probability {:.3} vs threshold {:.3} ({})",
        verdict.effective_probability, verdict.threshold, verdict.risk_appetite
    );
    println!(
        "Traditional score {}/{} recommends {}",
        verdict.traditional_score, MAX_SCORE, verdict.traditional_recommendation
    );

    let conflict = if verdict.conflict { "yes" } else { "no" };
    println!("Method conflict: {conflict}");
    match verdict.forced_by() {
        Some(rule) => println!("Forced by override: {}", rule.name()),
        None if verdict.decision == Decision::Review => {
            println!("Routed to manual review")
        }
        None => println!("Decided by threshold"),
    }

    if show_rationale {
        println!("Rationale");
        for entry in &verdict.rationale {
            println!("- {entry}");
        }
    }

    if !verdict.top_factors.is_empty() {
        println!("Top factors");
        for FeatureContribution {
            feature,
            contribution,
        } in &verdict.top_factors
        {
            println!("- {feature}: {contribution:+.3}");
        }
    }
}
