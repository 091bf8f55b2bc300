//! `booker` CLI — check availability, book, cancel, and list appointments from
//! the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Show free start times for a date
//! booker slots --date 2024-06-10
//!
//! # Book a slot (the guard re-checks it right before writing)
//! booker --owner alice book --date 2024-06-10 --time 10:30 \
//!   --name "John Doe" --contact 555-1234 --service "Beard Trim"
//!
//! # Your appointments and everyone else's
//! booker --owner alice list
//!
//! # Cancel by id
//! booker --owner alice cancel --id 6f1c7a8e-2f1e-4a4b-9a53-0d6c1c3a9b10
//!
//! # Look for double bookings that slipped through concurrent writes
//! booker audit
//! ```
//!
//! Exit codes: 0 on success, 1 on errors, 3 when a booking is rejected because
//! the slot is no longer available.

mod config;
mod file_store;

use std::process;

use anyhow::{Context, Result};
use booking_engine::{
    format_time, parse_date, parse_time, Booking, BookingDesk, BookingError, BookingId,
    BookingRequest, Clock, FixedClock, Service, SystemClock,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{GlobalArgs, Settings};
use crate::file_store::JsonFileStore;

const CONFLICT_EXIT_CODE: i32 = 3;

#[derive(Parser)]
#[command(
    name = "booker",
    version,
    about = "Book fixed-length appointments against one shared schedule"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable start times for a date
    Slots {
        /// Date to check (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Print a JSON array instead of one time per line
        #[arg(long)]
        json: bool,
    },
    /// Book an appointment
    Book {
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Start time (HH:MM)
        #[arg(short, long)]
        time: String,
        /// Client name
        #[arg(short, long)]
        name: String,
        /// Client email or phone
        #[arg(short, long)]
        contact: String,
        /// Service (Haircut, Beard Trim, Shave, Haircut & Beard Trim)
        #[arg(short, long, default_value = "Haircut")]
        service: String,
    },
    /// Cancel an appointment by id
    Cancel {
        /// Booking id
        #[arg(long)]
        id: String,
    },
    /// Show your appointments and everyone else's
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Report bookings that overlap each other
    Audit,
    /// Show the service menu
    Services,
}

/// Either the real clock or one frozen by `--now`.
enum CliClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for CliClock {
    fn now(&self) -> NaiveDateTime {
        match self {
            CliClock::System(c) => c.now(),
            CliClock::Fixed(c) => c.now(),
        }
    }

    fn now_utc(&self) -> DateTime<Utc> {
        match self {
            CliClock::System(c) => c.now_utc(),
            CliClock::Fixed(c) => c.now_utc(),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        if let Some(BookingError::Conflict(conflict)) = err.downcast_ref::<BookingError>() {
            eprintln!("Booking Conflict: {}", conflict.user_message());
            eprintln!("{}", conflict);
            process::exit(CONFLICT_EXIT_CODE);
        }
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_args(&cli.global)?;

    let clock = match settings.fixed_now {
        Some(now) => CliClock::Fixed(FixedClock::new(now)),
        None => CliClock::System(SystemClock),
    };
    let store = JsonFileStore::new(&settings.store_path);
    let desk = BookingDesk::new(store, clock, settings.rules).with_delete_policy(settings.delete_policy);

    match cli.command {
        Commands::Slots { date, json } => {
            let date = parse_date(&date)?;
            let slots = desk
                .available_slots(date)
                .with_context(|| format!("Failed to read bookings from {}", desk.store().path().display()))?;
            let times: Vec<String> = slots.into_iter().map(format_time).collect();

            if json {
                println!("{}", serde_json::to_string(&times)?);
            } else if times.is_empty() {
                println!("No available slots for this date.");
            } else {
                for time in times {
                    println!("{}", time);
                }
            }
        }
        Commands::Book {
            date,
            time,
            name,
            contact,
            service,
        } => {
            let request = BookingRequest {
                client_name: name,
                client_contact: contact,
                service: service.parse::<Service>()?,
                date: parse_date(&date)?,
                time: parse_time(&time)?,
            };
            let booking = desk.book(request, &settings.owner)?;
            println!("Appointment booked successfully!");
            println!("{}", describe(&booking));
        }
        Commands::Cancel { id } => {
            let id: BookingId = id.parse()?;
            desk.cancel(id, &settings.owner)?;
            println!("Appointment deleted successfully!");
        }
        Commands::List { json } => {
            let book = desk.appointments(&settings.owner)?;

            if json {
                let value = serde_json::json!({ "mine": book.mine, "others": book.others });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            println!("Your Booked Appointments");
            if book.mine.is_empty() {
                println!("  No appointments booked yet.");
            }
            for booking in &book.mine {
                println!("  {}", describe(booking));
            }
            if !book.others.is_empty() {
                println!("Other Booked Appointments");
                for booking in &book.others {
                    println!(
                        "  {} {}  {}  booked by {}",
                        booking.date,
                        format_time(booking.time),
                        booking.service,
                        booking.booked_by
                    );
                }
            }
        }
        Commands::Audit => {
            let found = desk.audit()?;
            if found.is_empty() {
                println!("No double bookings found.");
                return Ok(());
            }
            for pair in &found {
                println!(
                    "{} {} overlaps {} by {} minutes ({} / {})",
                    pair.first.date,
                    format_time(pair.first.time),
                    format_time(pair.second.time),
                    pair.overlap_minutes,
                    pair.first.id,
                    pair.second.id
                );
            }
            anyhow::bail!("{} double booking(s) found", found.len());
        }
        Commands::Services => {
            for service in Service::ALL {
                println!("{}", service);
            }
        }
    }

    Ok(())
}

fn describe(booking: &Booking) -> String {
    format!(
        "{} {}  {}  {} ({})  id={}",
        booking.date,
        format_time(booking.time),
        booking.service,
        booking.client_name,
        booking.client_contact,
        booking.id
    )
}
