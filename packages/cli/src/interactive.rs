//! Menu-driven interface using `dialoguer`, for running the tools without
//! memorizing flags.

use dialoguer::{Input, Select};
use geo_gestion_cli_utils::{MultiProgress, prompt_optional_text, prompt_optional_usize};

use crate::commands::{self, BulkOptions};
use crate::context::{self, Settings};

/// Top-level actions available in the interactive menu.
enum Action {
    Resolve,
    Correct,
    Matches,
    Streets,
    Bulk,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Resolve,
        Self::Correct,
        Self::Matches,
        Self::Streets,
        Self::Bulk,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Resolve => "Correct and geocode an address",
            Self::Correct => "Correct an address",
            Self::Matches => "Show closest streets",
            Self::Streets => "List official streets",
            Self::Bulk => "Process incident dataset",
            Self::Quit => "Quit",
        }
    }
}

fn prompt_address() -> Result<String, dialoguer::Error> {
    Input::new()
        .with_prompt("Address (street and number)")
        .interact_text()
}

/// Runs the interactive menu loop until the user quits.
///
/// The street registry is fetched once; geocoding results are cached for
/// the whole session.
///
/// # Errors
///
/// Returns an error if setup fails, the terminal cannot be read, or a bulk
/// run cannot load its dataset.
pub async fn run(
    settings: &Settings,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = context::build(settings).await?;

    println!("Geo gestión {}", ctx.profile.name);
    println!("{} official streets loaded", ctx.service.registry().len());
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Resolve => commands::resolve(&ctx, &prompt_address()?).await,
            Action::Correct => commands::correct(&ctx, &prompt_address()?),
            Action::Matches => commands::show_matches(&ctx, &prompt_address()?, 5),
            Action::Streets => commands::list_streets(&ctx),
            Action::Bulk => {
                let opts = BulkOptions {
                    csv: prompt_optional_text("CSV file (empty for the default dataset)")?
                        .map(Into::into),
                    limit: prompt_optional_usize("Row limit (empty for no limit)")?,
                    output: prompt_optional_text("Write results to CSV (empty to skip)")?
                        .map(Into::into),
                    ..BulkOptions::default()
                };
                if let Err(e) = commands::bulk(&ctx, multi, &opts).await {
                    log::error!("Bulk run failed: {e}");
                }
            }
            Action::Quit => break,
        }
        println!();
    }

    Ok(())
}
