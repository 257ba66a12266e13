use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgMatches, Command};
use mindcare_core::views::{
    self, AdminAppointments, AdminClients, AdminConsultations, AdminStats, AppointmentAction,
    ClientDashboard, ProfileEditor, StatusFilter,
};
use mindcare_core::{logging, Identity, Portal, PortalConfig, PortalError, Registration};
use mindcare_model::{
    BookingForm, ConsultationForm, LoginForm, Priority, Profile, RegistrationForm,
};
use std::path::PathBuf;
use uuid::Uuid;

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(Uuid))
        .help("Record id")
}

fn cli() -> Command {
    Command::new("mindcare")
        .version(mindcare_core::VERSION)
        .about("MindCare booking and consultation portal")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value("mindcare.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the TOML config file"),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in")
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true)),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(Arg::new("name").long("name").required(true).help("Full name"))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true))
                .arg(
                    Arg::new("confirm")
                        .long("confirm")
                        .help("Password confirmation; defaults to --password"),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out"))
        .subcommand(Command::new("whoami").about("Show the signed-in profile"))
        .subcommand(Command::new("dashboard").about("Upcoming appointments and recent requests"))
        .subcommand(
            Command::new("book")
                .about("Book an appointment")
                .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                .arg(Arg::new("time").long("time").required(true).help("HH:MM"))
                .arg(Arg::new("notes").long("notes").default_value("")),
        )
        .subcommand(
            Command::new("consult")
                .about("Submit a consultation request")
                .arg(Arg::new("subject").long("subject").required(true))
                .arg(Arg::new("message").long("message").required(true))
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .default_value("medium")
                        .value_parser(value_parser!(Priority)),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Show or edit your profile")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("dob").long("dob").help("YYYY-MM-DD, empty to clear"))
                        .arg(Arg::new("emergency").long("emergency"))
                        .arg(Arg::new("medical").long("medical")),
                ),
        )
        .subcommand(
            Command::new("admin")
                .about("Practice administration")
                .subcommand_required(true)
                .subcommand(Command::new("stats").about("Dashboard counters"))
                .subcommand(
                    Command::new("appointments").arg(
                        Arg::new("status")
                            .long("status")
                            .default_value("all")
                            .value_parser(["all", "pending", "confirmed", "completed"]),
                    ),
                )
                .subcommand(Command::new("confirm").arg(id_arg()))
                .subcommand(Command::new("cancel").arg(id_arg()))
                .subcommand(Command::new("complete").arg(id_arg()))
                .subcommand(
                    Command::new("clients")
                        .arg(Arg::new("id").long("show").value_parser(value_parser!(Uuid))),
                )
                .subcommand(Command::new("consultations"))
                .subcommand(Command::new("progress").arg(id_arg()))
                .subcommand(
                    Command::new("respond")
                        .arg(id_arg())
                        .arg(Arg::new("response").required(true)),
                ),
        )
}

fn text(args: &ArgMatches, name: &str) -> String {
    args.get_one::<String>(name).cloned().unwrap_or_default()
}

/// Turn a portal error into the message the user sees
fn explain(err: PortalError) -> anyhow::Error {
    let redirect = err.redirect();
    let message = err.notice().unwrap_or_else(|| err.to_string());
    match redirect {
        Some(route) => anyhow!("{message} (redirect: {route})"),
        None => anyhow!(message),
    }
}

fn print_profile(profile: &Profile) {
    println!("{} <{}> [{}]", profile.full_name, profile.email, profile.role);
    println!("  id:                {}", profile.id);
    println!("  phone:             {}", profile.phone.as_deref().unwrap_or("-"));
    println!(
        "  date of birth:     {}",
        profile
            .date_of_birth
            .map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    println!("  emergency contact: {}", profile.emergency_contact.as_deref().unwrap_or("-"));
    println!("  medical history:   {}", profile.medical_history.as_deref().unwrap_or("-"));
}

async fn run(portal: &Portal, matches: &ArgMatches) -> Result<(), PortalError> {
    match matches.subcommand() {
        Some(("login", args)) => {
            let form = LoginForm {
                email: text(args, "email"),
                password: text(args, "password"),
            };
            let (profile, home) = portal.sign_in(&form).await?;
            println!("Signed in as {} ({}). Home: {home}", profile.full_name, profile.role);
        }
        Some(("register", args)) => {
            let password = text(args, "password");
            let form = RegistrationForm {
                full_name: text(args, "name"),
                email: text(args, "email"),
                confirm_password: args
                    .get_one::<String>("confirm")
                    .cloned()
                    .unwrap_or_else(|| password.clone()),
                password,
            };
            match portal.register(&form).await? {
                Registration::SignedIn(profile) => {
                    println!("Account created. Signed in as {}", profile.full_name);
                }
                Registration::ConfirmationPending { email } => {
                    println!("Account created. Check {email} to confirm it, then sign in.");
                }
            }
        }
        Some(("logout", _)) => {
            let route = portal.sign_out().await;
            println!("Signed out. Home: {route}");
        }
        Some(("whoami", _)) => match portal.session().current_identity() {
            Identity::Authenticated(profile) => print_profile(&profile),
            Identity::Anonymous | Identity::Loading => println!("Not signed in"),
        },
        Some(("dashboard", _)) => {
            let mut dashboard = ClientDashboard::new();
            dashboard.load(portal).await?;
            println!("Upcoming appointments:");
            for a in dashboard.appointments.items() {
                println!("  {} {} {} {}", a.id, a.appointment_date, a.appointment_time, a.status);
            }
            println!("Recent consultation requests:");
            for c in dashboard.consultations.items() {
                println!("  {} [{}] {} ({})", c.id, c.priority.label(), c.subject, c.status);
            }
        }
        Some(("book", args)) => {
            let form = BookingForm {
                appointment_date: text(args, "date"),
                appointment_time: text(args, "time"),
                notes: text(args, "notes"),
            };
            let appointment = views::booking::book(portal, &form, Portal::today()).await?;
            println!("{} ({})", views::booking::BOOKED_NOTICE, appointment.id);
        }
        Some(("consult", args)) => {
            let form = ConsultationForm {
                subject: text(args, "subject"),
                message: text(args, "message"),
                priority: args.get_one::<Priority>("priority").copied().unwrap_or_default(),
            };
            let request = views::consultation::submit(portal, &form).await?;
            println!("{} ({})", views::consultation::SUBMITTED_NOTICE, request.id);
        }
        Some(("profile", args)) => run_profile(portal, args).await?,
        Some(("admin", args)) => run_admin(portal, args).await?,
        _ => {}
    }
    Ok(())
}

async fn run_profile(portal: &Portal, matches: &ArgMatches) -> Result<(), PortalError> {
    let mut editor = ProfileEditor::open(portal)?;
    if let Some(("update", args)) = matches.subcommand() {
        let form = &mut editor.form;
        for (name, field) in [
            ("name", &mut form.full_name),
            ("phone", &mut form.phone),
            ("dob", &mut form.date_of_birth),
            ("emergency", &mut form.emergency_contact),
            ("medical", &mut form.medical_history),
        ] {
            if let Some(value) = args.get_one::<String>(name) {
                value.clone_into(field);
            }
        }
        let profile = editor.save(portal).await?;
        println!("{}", views::profile::SAVED_NOTICE);
        print_profile(&profile);
    } else if let Identity::Authenticated(profile) = portal.session().current_identity() {
        print_profile(&profile);
    }
    Ok(())
}

async fn run_admin(portal: &Portal, matches: &ArgMatches) -> Result<(), PortalError> {
    let mut appointments = AdminAppointments::new();
    let mut consultations = AdminConsultations::new();

    match matches.subcommand() {
        Some(("stats", _)) => {
            let stats = AdminStats::load(portal, Portal::today()).await?;
            println!("Total clients:          {}", stats.total_clients);
            println!("Pending appointments:   {}", stats.pending_appointments);
            println!("Pending consultations:  {}", stats.pending_consultations);
            println!("Today's appointments:   {}", stats.todays_appointments);
        }
        Some(("appointments", args)) => {
            appointments.filter = match text(args, "status").as_str() {
                "pending" => StatusFilter::Pending,
                "confirmed" => StatusFilter::Confirmed,
                "completed" => StatusFilter::Completed,
                _ => StatusFilter::All,
            };
            appointments.load(portal).await?;
            for row in appointments.visible() {
                let a = &row.appointment;
                let client = row.client.as_ref().map_or("-", |c| c.full_name.as_str());
                let actions = AppointmentAction::available(a.status)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("/");
                println!(
                    "{} {} {} {:<9} {client} [{actions}]",
                    a.id, a.appointment_date, a.appointment_time, a.status
                );
            }
        }
        Some((name @ ("confirm" | "cancel" | "complete"), args)) => {
            let action = match name {
                "confirm" => AppointmentAction::Confirm,
                "cancel" => AppointmentAction::Cancel,
                _ => AppointmentAction::Complete,
            };
            let id = args.get_one::<Uuid>("id").copied().unwrap_or_default();
            let updated = appointments.act(portal, id, action).await?;
            println!("{} ({})", action.notice(), updated.id);
        }
        Some(("clients", args)) => {
            let mut clients = AdminClients::new();
            clients.load(portal).await?;
            match args.get_one::<Uuid>("id") {
                Some(id) => match clients.select((*id).into()) {
                    Some(profile) => print_profile(profile),
                    None => println!("No client with id {id}"),
                },
                None => {
                    for p in clients.list.items() {
                        println!("{} {} <{}> joined {}", p.id, p.full_name, p.email, p.created_at.date_naive());
                    }
                }
            }
        }
        Some(("consultations", _)) => {
            consultations.load(portal).await?;
            for row in consultations.list.items() {
                let c = &row.request;
                let client = row.client.as_ref().map_or("-", |c| c.full_name.as_str());
                println!("{} [{}] {:<11} {client}: {}", c.id, c.priority.label(), c.status, c.subject);
                if let Some(response) = &c.admin_response {
                    println!("    response: {response}");
                }
            }
        }
        Some(("progress", args)) => {
            let id = args.get_one::<Uuid>("id").copied().unwrap_or_default();
            consultations.mark_in_progress(portal, id).await?;
            println!("{}", views::admin_consultations::IN_PROGRESS_NOTICE);
        }
        Some(("respond", args)) => {
            let id = args.get_one::<Uuid>("id").copied().unwrap_or_default();
            consultations.respond(portal, id, &text(args, "response")).await?;
            println!("{}", views::admin_consultations::RESPONDED_NOTICE);
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config_path = matches.get_one::<PathBuf>("config").cloned();

    let config = PortalConfig::load(config_path.as_deref()).context("loading configuration")?;
    logging::init(&config.log_filter);

    let portal = Portal::connect(config).map_err(explain)?;
    if let Err(err) = portal.start().await {
        tracing::warn!(error = %err, "could not restore session");
    }

    run(&portal, &matches).await.map_err(explain)
}
