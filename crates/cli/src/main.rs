use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use triage_core::config::{history_file_from_env_value, kb_dir_from_env_value};
use triage_core::{
    validate_patient, CoreConfig, ForecastReport, PatientInput, TriageResult, TriageService,
    ValidationErrors,
};
use triage_kb::KnowledgeBase;
use triage_types::Region;

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Field triage scoring engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a patient read from a JSON or YAML file
    Assess {
        /// Patient file (.json, .yaml or .yml)
        file: PathBuf,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recorded triages
    History {
        /// Only show the most recent entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show aggregate triage statistics
    Stats,
    /// Forecast medication needs from recent history
    Forecast {
        #[arg(long, default_value_t = 30)]
        window_days: u32,
        #[arg(long, default_value_t = 30)]
        projection_days: u32,
    },
    /// Print a medication shopping list grouped by priority
    ShoppingList {
        #[arg(long, default_value_t = 30)]
        window_days: u32,
        #[arg(long, default_value_t = 30)]
        projection_days: u32,
    },
    /// List the diseases of a knowledge base
    Diseases {
        /// Region code (omit for the general base)
        #[arg(long)]
        region: Option<String>,
    },
    /// Validate a knowledge-base directory
    CheckKb {
        /// Directory containing general.yaml and optional regional files
        dir: PathBuf,
    },
}

fn build_service() -> Result<TriageService, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::new(
        history_file_from_env_value(std::env::var("TRIAGE_HISTORY_FILE").ok()),
        kb_dir_from_env_value(std::env::var("TRIAGE_KB_DIR").ok()),
    )?;
    Ok(TriageService::from_config(&cfg)?)
}

/// Read a patient from `path`, choosing YAML or JSON by extension.
fn read_patient(path: &Path) -> Result<PatientInput, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let patient = if is_yaml {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(patient)
}

/// Read a patient file and range-check it before any scoring.
fn load_patient(path: &Path) -> Result<PatientInput, Box<dyn std::error::Error>> {
    let patient = read_patient(path)?;
    validate_patient(&patient)?;
    Ok(patient)
}

fn print_result(result: &TriageResult) {
    println!("Diagnosis: {} ({}%)", result.diagnosis, result.probability);
    println!("Urgency: {}", result.urgency);
    println!("Medication: {}", result.medication);
    if let Some(region) = &result.region_name {
        println!("Region: {}", region);
    }
    if let Some(period) = &result.incubation_period {
        println!("Incubation: {}", period);
    }
    if !result.differentials.is_empty() {
        println!("Differentials:");
        for d in &result.differentials {
            println!("  - {} ({}%)", d.label, d.probability);
        }
    }
    println!("Observations:");
    for line in &result.observations {
        println!("  - {}", line);
    }
    println!("Recommendations:");
    for line in &result.recommendations {
        println!("  - {}", line);
    }
}

fn print_forecast(report: &ForecastReport) {
    println!(
        "Window: {} days ({} triages, {:.2}/day), projection: {} days ({:.1} triages)",
        report.window_days,
        report.triage_count,
        report.daily_mean,
        report.projection_days,
        report.projected_triages
    );
    if report.medications.is_empty() {
        println!("No prescriptions in the window.");
    }
    for m in &report.medications {
        println!(
            "[{}] {}: {} (+{} margin) = {} units, {:.1}% of triages, {} uses",
            m.priority,
            m.name,
            m.projected_need,
            m.safety_margin,
            m.total_needed,
            m.frequency_percent,
            m.used_in_window
        );
    }
    println!("Top diagnoses:");
    for entry in &report.top_diagnoses {
        println!("  - {}: {}", entry.label, entry.count);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Assess { file, json }) => {
            let patient = match load_patient(&file) {
                Ok(patient) => patient,
                Err(e) => {
                    if let Some(invalid) = e.downcast_ref::<ValidationErrors>() {
                        eprintln!("Invalid patient input:");
                        for message in invalid.messages() {
                            eprintln!("  - {}", message);
                        }
                    }
                    return Err(e);
                }
            };
            let result = build_service()?.triage(&patient)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Some(Commands::History { limit }) => {
            let records = build_service()?.history()?;
            if records.is_empty() {
                println!("No triages recorded.");
            }
            let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
            for record in records.iter().skip(skip) {
                println!(
                    "{} {} age {}: {} [{}]",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.id,
                    record.patient.age,
                    record.result.diagnosis,
                    record.result.urgency
                );
            }
        }
        Some(Commands::Stats) => {
            let stats = build_service()?.statistics()?;
            println!("Total triages: {}", stats.total);
            match stats.mean_age {
                Some(age) => println!("Mean age: {:.1}", age),
                None => println!("Mean age: n/a"),
            }
            println!("Diagnoses:");
            for (label, count) in &stats.diagnosis_frequency {
                println!("  - {}: {}", label, count);
            }
            println!("Urgency:");
            for (level, count) in &stats.urgency_distribution {
                println!("  - {}: {}", level, count);
            }
            println!("Climatic events:");
            for (event, count) in &stats.climate_event_frequency {
                println!("  - {}: {}", event, count);
            }
        }
        Some(Commands::Forecast {
            window_days,
            projection_days,
        }) => {
            let report = build_service()?.forecast_medication_needs(window_days, projection_days)?;
            print_forecast(&report);
        }
        Some(Commands::ShoppingList {
            window_days,
            projection_days,
        }) => {
            let list = build_service()?.shopping_list(window_days, projection_days)?;
            println!("{}", list);
        }
        Some(Commands::Diseases { region }) => {
            let region = region.map(|r| r.parse::<Region>()).transpose()?;
            let service = build_service()?;
            let base = service.knowledge_base().regional_base(region)?;
            println!("{} ({} diseases)", base.name, base.diseases.len());
            for disease in &base.diseases {
                let prevalence = disease
                    .prevalence
                    .map(|p| format!(", prevalence {}", p))
                    .unwrap_or_default();
                println!(
                    "  - {} [{}]: severity {}{}",
                    disease.label, disease.id, disease.severity, prevalence
                );
            }
        }
        Some(Commands::CheckKb { dir }) => {
            let kb = KnowledgeBase::from_dir(&dir)?;
            println!(
                "Knowledge base OK: general ({} diseases)",
                kb.general().diseases.len()
            );
            for region in kb.regions() {
                let count = kb
                    .regional_base(Some(region))
                    .map(|b| b.diseases.len())
                    .unwrap_or_default();
                println!("  - {}: {} diseases", region, count);
            }
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use triage_types::Symptom;

    #[test]
    fn test_read_patient_yaml_and_json() {
        let temp = TempDir::new().expect("temp dir");

        let yaml = temp.path().join("patient.yaml");
        std::fs::write(
            &yaml,
            "age: 30\nweight_kg: 70\ntemperature_c: 38.5\nsystolic_bp: 120\n\
             diastolic_bp: 80\nheart_rate: 90\nsymptoms: [chills, headache]\n\
             region: brazil_north\n",
        )
        .expect("write yaml");
        let patient = read_patient(&yaml).expect("yaml patient");
        assert_eq!(patient.region, Some(Region::BrazilNorth));
        assert!(patient.symptoms.contains(&Symptom::Chills));

        let json = temp.path().join("patient.json");
        std::fs::write(
            &json,
            r#"{"age": 5, "weight_kg": 18, "temperature_c": 36.8,
                "systolic_bp": 100, "diastolic_bp": 65, "heart_rate": 95}"#,
        )
        .expect("write json");
        let patient = read_patient(&json).expect("json patient");
        assert_eq!(patient.age, 5);
        assert!(patient.symptoms.is_empty());
    }

    #[test]
    fn test_read_patient_rejects_unknown_field() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("patient.json");
        std::fs::write(
            &path,
            r#"{"age": 5, "weight_kg": 18, "temperature_c": 36.8, "systolic_bp": 100,
                "diastolic_bp": 65, "heart_rate": 95, "blood_type": "O+"}"#,
        )
        .expect("write json");
        assert!(read_patient(&path).is_err());
    }

    #[test]
    fn test_load_patient_rejects_out_of_range_vitals() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("patient.yaml");
        std::fs::write(
            &path,
            "age: 30\nweight_kg: 70\ntemperature_c: 50\nsystolic_bp: 120\n\
             diastolic_bp: 130\nheart_rate: 90\n",
        )
        .expect("write yaml");

        let err = load_patient(&path).expect_err("out of range");
        let invalid = err
            .downcast_ref::<ValidationErrors>()
            .expect("validation error");
        assert_eq!(invalid.messages().len(), 2);
        assert!(invalid.messages()[0].starts_with("temperature_c"));
    }

    #[test]
    fn test_load_patient_accepts_valid_record() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("patient.json");
        std::fs::write(
            &path,
            r#"{"age": 40, "weight_kg": 80, "temperature_c": 37.0,
                "systolic_bp": 125, "diastolic_bp": 82, "heart_rate": 72}"#,
        )
        .expect("write json");
        assert_eq!(load_patient(&path).expect("valid").age, 40);
    }

    #[test]
    fn test_cli_parses_forecast_defaults() {
        let cli = Cli::try_parse_from(["triage", "forecast", "--window-days", "14"])
            .expect("parse");
        match cli.command {
            Some(Commands::Forecast {
                window_days,
                projection_days,
            }) => {
                assert_eq!(window_days, 14);
                assert_eq!(projection_days, 30);
            }
            _ => panic!("expected forecast command"),
        }
    }
}
