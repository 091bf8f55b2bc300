//! # CLI configuration
//!
//! Every global option can come from the command line or the environment, and
//! a `.env` file in the working directory is loaded first.
//!
//! ## Environment variables
//!
//! - `BOOKING_STORE`: path of the JSON booking file (default: "bookings.json")
//! - `BOOKING_OWNER`: owner identity recorded in `bookedBy` (default: "anonymous")
//! - `BOOKING_OPEN_HOUR`: opening hour, 0-23 (default: 9)
//! - `BOOKING_CLOSE_HOUR`: closing hour, 0-23 (default: 17)
//! - `BOOKING_SLOT_MINUTES`: slot width in minutes (default: 30)
//! - `BOOKING_DELETE_POLICY`: "shared" or "owner-only" (default: "shared")
//! - `BOOKING_NOW`: fixed local "now" such as "2024-06-10T10:07", for scripting
//! - `RUST_LOG`: log filter (default: "warn")

use std::path::PathBuf;

use anyhow::{Context, Result};
use booking_engine::{parse_now, DeletePolicy, OwnerId, ScheduleRules};
use chrono::NaiveDateTime;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// JSON file holding the bookings
    #[arg(long, global = true, env = "BOOKING_STORE", default_value = "bookings.json")]
    pub store: PathBuf,

    /// Identity to book and cancel as
    #[arg(long, global = true, env = "BOOKING_OWNER", default_value = "anonymous")]
    pub owner: String,

    /// Opening hour (0-23)
    #[arg(long, global = true, env = "BOOKING_OPEN_HOUR", default_value_t = 9)]
    pub open_hour: u32,

    /// Closing hour (0-23)
    #[arg(long, global = true, env = "BOOKING_CLOSE_HOUR", default_value_t = 17)]
    pub close_hour: u32,

    /// Length of every appointment in minutes
    #[arg(long, global = true, env = "BOOKING_SLOT_MINUTES", default_value_t = 30)]
    pub slot_minutes: u32,

    /// Who may cancel a booking: "shared" or "owner-only"
    #[arg(long, global = true, env = "BOOKING_DELETE_POLICY", default_value = "shared")]
    pub delete_policy: String,

    /// Freeze the clock at this local time (e.g., 2024-06-10T10:07)
    #[arg(long, global = true, env = "BOOKING_NOW")]
    pub now: Option<String>,
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store_path: PathBuf,
    pub owner: OwnerId,
    pub rules: ScheduleRules,
    pub delete_policy: DeletePolicy,
    pub fixed_now: Option<NaiveDateTime>,
}

impl Settings {
    /// # Errors
    ///
    /// Fails when the business hours or slot width are invalid, the delete
    /// policy is unknown, the owner is blank, or `--now` cannot be parsed.
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let rules = ScheduleRules::from_parts(args.open_hour, args.close_hour, args.slot_minutes)
            .context("Invalid schedule configuration")?;

        let delete_policy: DeletePolicy = args
            .delete_policy
            .parse()
            .context("Invalid BOOKING_DELETE_POLICY value")?;

        let owner = args.owner.trim();
        if owner.is_empty() {
            anyhow::bail!("Owner identity must not be empty");
        }

        let fixed_now = args
            .now
            .as_deref()
            .map(parse_now)
            .transpose()
            .context("Invalid --now value, expected YYYY-MM-DDTHH:MM")?;

        Ok(Self {
            store_path: args.store.clone(),
            owner: OwnerId::new(owner),
            rules,
            delete_policy,
            fixed_now,
        })
    }
}
