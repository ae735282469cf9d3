use clap::{Parser, Subcommand};

use crate::models::{EventId, MenuItemId, ProfileType, SpiceIndex};

/// IntelliCater: sizes ingredient procurement and JIT cooking batches for catered events.
#[derive(Parser, Debug)]
#[command(name = "intelli_cater")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the catalog JSON file (ingredients and menu items).
    #[arg(short, long, default_value = "catalog.json")]
    pub catalog: String,

    /// Path to the events JSON file.
    #[arg(short, long, default_value = "events.json")]
    pub events: String,

    /// Path to the published plans JSON file.
    #[arg(short, long, default_value = "plans.json")]
    pub plans: String,

    /// Optional engine config JSON file.
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search menu items by name or category.
    Menu {
        /// Case-insensitive search term; omit to list everything.
        term: Option<String>,
    },

    /// Build the catalog from inventory and recipe CSV sheets.
    Import {
        #[arg(long)]
        inventory: String,

        #[arg(long)]
        recipes: String,

        /// Output catalog path (defaults to --catalog).
        #[arg(long)]
        out: Option<String>,
    },

    /// Create or list events.
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Calculate the ingredient indent for an event.
    Indent {
        event_id: EventId,

        /// Also write the indent as a CSV procurement sheet.
        #[arg(long)]
        csv: Option<String>,
    },

    /// Show the JIT batch plan for an event.
    Plan { event_id: EventId },

    /// Move a batch one step forward (Pending, Cooking, Ready, Served).
    Advance {
        event_id: EventId,
        batch_id: u32,

        /// Live consumption variance in percent, checked by gated batches.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        variance: f64,
    },

    /// List what the held-back final batch saved from being cooked.
    Waste { event_id: EventId },
}

#[derive(Subcommand, Debug)]
pub enum EventAction {
    /// Create an event; prompts for anything not given as a flag.
    Create {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        venue: Option<String>,

        /// Start time, "YYYY-MM-DD HH:MM".
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        male: Option<i64>,

        #[arg(long)]
        female: Option<i64>,

        #[arg(long)]
        child: Option<i64>,

        #[arg(long, value_enum)]
        profile: Option<ProfileType>,

        #[arg(long, value_enum)]
        spice: Option<SpiceIndex>,

        #[arg(long)]
        fat_boost: bool,

        /// Menu item ids, comma separated.
        #[arg(long, value_delimiter = ',')]
        items: Vec<MenuItemId>,
    },

    /// List saved events.
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_with_flags() {
        let cli = Cli::try_parse_from([
            "intelli_cater",
            "event",
            "create",
            "--name",
            "Gala",
            "--male",
            "120",
            "--profile",
            "rural",
            "--items",
            "1,4,9",
        ])
        .unwrap();

        match cli.command {
            Command::Event {
                action:
                    EventAction::Create {
                        name,
                        male,
                        profile,
                        items,
                        ..
                    },
            } => {
                assert_eq!(name.as_deref(), Some("Gala"));
                assert_eq!(male, Some(120));
                assert_eq!(profile, Some(ProfileType::Rural));
                assert_eq!(items, vec![1, 4, 9]);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.catalog, "catalog.json");
    }

    #[test]
    fn test_parse_advance_negative_variance() {
        let cli =
            Cli::try_parse_from(["intelli_cater", "advance", "3", "2", "--variance", "-4.5"]).unwrap();
        match cli.command {
            Command::Advance {
                event_id,
                batch_id,
                variance,
            } => {
                assert_eq!((event_id, batch_id), (3, 2));
                assert_eq!(variance, -4.5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
