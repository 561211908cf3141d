use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use medilabo_core::repositories::cohort::{demo_cohort, load_cohort};
use medilabo_core::{
    resolve_engine_config, AssessmentEngine, AssessmentResult, CohortOutcome, Gender,
    InMemoryRecords, MedilaboError, NoteRepository, Patient, PatientId, PatientRepository,
    RiskDistribution, RiskLevel,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medilabo")]
#[command(about = "MediLabo diabetes-risk assessment CLI")]
struct Cli {
    /// Cohort file (YAML). Defaults to the bundled demonstration cohort
    #[arg(long, global = true, env = "MEDILABO_RECORDS")]
    records: Option<PathBuf>,

    /// Engine config file (YAML) overriding the vocabulary or decision table
    #[arg(long, global = true, env = "MEDILABO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess one patient
    Assess {
        /// Patient id
        patient_id: PatientId,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Assess every patient and print the risk distribution
    Cohort {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List triggers found in ad-hoc text (each argument is one note)
    Scan {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Classify an age, gender and trigger count directly
    Classify {
        #[arg(long)]
        age: u32,
        /// M or F
        #[arg(long, value_parser = parse_gender)]
        gender: Gender,
        #[arg(long)]
        triggers: usize,
    },
    /// List patients, optionally filtered by name, gender or assessed risk
    List {
        /// Case-insensitive text to find in the patient's "first last" name
        #[arg(long, default_value = "")]
        search: String,
        /// M or F
        #[arg(long, value_parser = parse_gender)]
        gender: Option<Gender>,
        /// Keep only patients assessed at this level (e.g. "In Danger")
        #[arg(long, value_parser = parse_risk)]
        risk: Option<RiskLevel>,
        /// Reference date for the risk filter (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Show or search clinical notes
    Notes {
        /// Restrict to one patient
        #[arg(long)]
        patient: Option<PatientId>,
        /// Case-insensitive text to find in note content or patient name
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Print the configured trigger vocabulary
    Vocabulary,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{s}': {e}"))
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    Gender::parse(s).map_err(|e| e.to_string())
}

fn parse_risk(s: &str) -> Result<RiskLevel, String> {
    s.parse()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn load_records(path: Option<PathBuf>) -> anyhow::Result<InMemoryRecords> {
    match path {
        Some(path) => load_cohort(&path)
            .with_context(|| format!("loading records from {}", path.display())),
        None => {
            tracing::debug!("no records file given, using the demonstration cohort");
            Ok(demo_cohort()?)
        }
    }
}

/// Patients from `patients` whose assessment on `reference_date` lands on `risk`.
///
/// Patients that cannot be assessed never match.
fn filter_by_risk<'p>(
    engine: &AssessmentEngine,
    records: &InMemoryRecords,
    patients: Vec<&'p Patient>,
    risk: RiskLevel,
    reference_date: NaiveDate,
) -> anyhow::Result<Vec<&'p Patient>> {
    let mut kept = Vec::new();
    for patient in patients {
        let notes = records.notes_for(patient.id)?;
        match engine.assess(patient, &notes, reference_date) {
            Ok(result) if result.risk_level == risk => kept.push(patient),
            Ok(_) => {}
            Err(e) => tracing::debug!("excluded from risk filter: {}", e),
        }
    }
    Ok(kept)
}

fn format_patient(patient: &Patient) -> String {
    format!(
        "ID: {}, Name: {}, Born: {}, Gender: {}",
        patient.id,
        patient.full_name(),
        patient.birth_date.as_deref().unwrap_or("-"),
        patient.gender
    )
}

fn format_result(result: &AssessmentResult) -> String {
    let triggers: Vec<&str> = result.triggers_found.iter().collect();
    let triggers = if triggers.is_empty() {
        "-".to_string()
    } else {
        triggers.join(", ")
    };
    format!(
        "Patient {} ({}), age {}, {}\n  Triggers ({}): {}\n  Risk: {}\n",
        result.patient_id,
        result.patient_name,
        result.age_at_assessment,
        result.gender,
        result.trigger_count,
        triggers,
        result.risk_level
    )
}

fn format_distribution(dist: &RiskDistribution) -> String {
    let mut out = format!("Risk distribution ({} assessed):\n", dist.assessed());
    for entry in dist.entries() {
        out.push_str(&format!(
            "  {:<12} {:>3} ({:>3}%)\n",
            entry.level.label(),
            entry.count,
            entry.percent
        ));
    }
    if dist.failed() > 0 {
        out.push_str(&format!(
            "  {} patient(s) could not be assessed\n",
            dist.failed()
        ));
    }
    out
}

/// Text report for `medilabo cohort`.
fn format_cohort(outcomes: &[CohortOutcome], dist: &RiskDistribution) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        match &outcome.outcome {
            Ok(result) => out.push_str(&format_result(result)),
            Err(e) => out.push_str(&format!(
                "Patient {}: {} ({})\n",
                outcome.patient_id,
                e.user_message(),
                e
            )),
        }
    }
    out.push('\n');
    out.push_str(&format_distribution(dist));
    out
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medilabo=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(resolve_engine_config(cli.config)?);
    let engine = AssessmentEngine::new(cfg);

    match cli.command {
        Some(Commands::Assess {
            patient_id,
            date,
            json,
        }) => {
            let records = load_records(cli.records)?;
            let reference_date = date.unwrap_or_else(today);
            match engine.assess_by_id(&records, patient_id, reference_date) {
                Ok(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
                Ok(result) => print!("{}", format_result(&result)),
                Err(MedilaboError::Validation(e)) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Cohort { date, json }) => {
            let records = load_records(cli.records)?;
            let reference_date = date.unwrap_or_else(today);
            let patients = records.patients()?;
            let notes = records.notes()?;
            let outcomes = engine.assess_cohort(&patients, &notes, reference_date);
            let dist = RiskDistribution::from_outcomes(&outcomes);

            if json {
                let entries: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|o| match &o.outcome {
                        Ok(result) => serde_json::json!({ "result": result }),
                        Err(e) => serde_json::json!({
                            "patientId": o.patient_id,
                            "error": e.to_string(),
                        }),
                    })
                    .collect();
                let doc = serde_json::json!({
                    "referenceDate": reference_date,
                    "assessments": entries,
                    "distribution": dist.entries(),
                    "failed": dist.failed(),
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", format_cohort(&outcomes, &dist));
            }
        }
        Some(Commands::Scan { text }) => {
            let found = engine
                .config()
                .vocabulary()
                .scanner()
                .scan_texts(text.iter().map(String::as_str));
            if found.is_empty() {
                println!("No triggers found.");
            } else {
                for term in found.iter() {
                    println!("{}", term);
                }
            }
        }
        Some(Commands::Classify {
            age,
            gender,
            triggers,
        }) => {
            let level: RiskLevel = engine.config().stratifier().classify(age, gender, triggers);
            println!("{}", level);
        }
        Some(Commands::List {
            search,
            gender,
            risk,
            date,
        }) => {
            let records = load_records(cli.records)?;
            let mut patients = records.search_patients(&search, gender);
            if let Some(risk) = risk {
                let reference_date = date.unwrap_or_else(today);
                patients = filter_by_risk(&engine, &records, patients, risk, reference_date)?;
            }
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!("{}", format_patient(patient));
            }
        }
        Some(Commands::Notes { patient, search }) => {
            let records = load_records(cli.records)?;
            let notes = records.search_notes(&search, patient);
            if notes.is_empty() {
                println!("No notes found.");
            }
            for note in notes {
                println!(
                    "[{}] patient {} {} ({})",
                    note.id,
                    note.patient_id,
                    note.date,
                    note.practitioner.as_deref().unwrap_or("unknown")
                );
                println!("  {}", note.content);
            }
        }
        Some(Commands::Vocabulary) => {
            for term in engine.config().vocabulary().terms() {
                println!("{}", term);
            }
        }
        None => {
            println!("Use 'medilabo --help' for commands");
        }
    }

    Ok(())
}
