use api_shared::MessageRes;
use clap::{Parser, Subcommand};
use registry_core::{
    config::patient_data_dir_from_env_value, open_store, AddressRequest, CoreConfig,
    CreatePatientRequest, PatientService, PatientStatus, StoreKind,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Patient registry CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Show {
        /// Patient id
        id: String,
    },
    /// Create a patient
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        middle_name: Option<String>,
        #[arg(long)]
        last_name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: String,
        /// Inquiry, Onboarding, Active or Churned
        #[arg(long)]
        status: PatientStatus,
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zip_code: String,
    },
    /// Delete a patient
    Delete {
        /// Patient id
        id: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'registry --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(
        patient_data_dir_from_env_value(std::env::var("PATIENT_DATA_DIR").ok()),
        StoreKind::File,
    )?;
    let service = PatientService::new(open_store(&cfg)?);

    println!("{}", run(command, &service)?);
    Ok(())
}

/// Execute one command and render its result as pretty JSON.
fn run(command: Commands, service: &PatientService) -> anyhow::Result<String> {
    match command {
        Commands::List => to_json(&service.list_all()?),
        Commands::Show { id } => to_json(&service.get_by_id(&id)?),
        Commands::Create {
            first_name,
            middle_name,
            last_name,
            date_of_birth,
            status,
            street,
            city,
            state,
            zip_code,
        } => {
            let request = CreatePatientRequest {
                first_name: Some(first_name),
                middle_name,
                last_name: Some(last_name),
                date_of_birth: Some(date_of_birth),
                status: Some(status),
                address: Some(AddressRequest {
                    street: Some(street),
                    city: Some(city),
                    state: Some(state),
                    zip_code: Some(zip_code),
                }),
            };
            to_json(&service.create(request)?)
        }
        Commands::Delete { id } => {
            service.delete(&id)?;
            to_json(&MessageRes::new("Patient deleted successfully"))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_core::{ErrorKind, FileStore, Patient, PatientError};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn temp_service() -> (TempDir, PatientService) {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf(), StoreKind::File).unwrap();
        let service = PatientService::new(Arc::new(FileStore::open(&cfg).unwrap()));
        (temp, service)
    }

    fn command(args: &[&str]) -> Commands {
        let mut argv = vec!["registry"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command.unwrap()
    }

    fn create_args(zip_code: &str) -> Commands {
        command(&[
            "create",
            "--first-name",
            "Alice",
            "--last-name",
            "Johnson",
            "--date-of-birth",
            "1995-10-20",
            "--status",
            "Active",
            "--street",
            "789 Pine St",
            "--city",
            "Elsewhere",
            "--state",
            "TX",
            "--zip-code",
            zip_code,
        ])
    }

    #[test]
    fn create_show_list_delete() {
        let (_temp, service) = temp_service();

        let created: Patient = serde_json::from_str(&run(create_args("54321"), &service).unwrap())
            .unwrap();
        let id = created.id.to_string();

        let shown: Patient =
            serde_json::from_str(&run(command(&["show", &id]), &service).unwrap()).unwrap();
        assert_eq!(shown, created);

        let listed: Vec<Patient> =
            serde_json::from_str(&run(command(&["list"]), &service).unwrap()).unwrap();
        assert_eq!(listed, vec![created]);

        let deleted = run(command(&["delete", &id]), &service).unwrap();
        assert!(deleted.contains("Patient deleted successfully"));
        assert_eq!(run(command(&["list"]), &service).unwrap(), "[]");
    }

    #[test]
    fn invalid_create_reports_validation_failure() {
        let (_temp, service) = temp_service();

        let err = run(create_args("1234"), &service).unwrap_err();
        let err = err.downcast_ref::<PatientError>().unwrap();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn unknown_status_is_rejected_by_the_parser() {
        let result = Cli::try_parse_from([
            "registry", "create", "--first-name", "A", "--last-name", "B", "--date-of-birth",
            "1995-10-20", "--status", "Inactive", "--street", "s", "--city", "c", "--state", "TX",
            "--zip-code", "12345",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn show_unknown_id_is_not_found() {
        let (_temp, service) = temp_service();

        let err = run(command(&["show", "not-an-id"]), &service).unwrap_err();
        let err = err.downcast_ref::<PatientError>().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
