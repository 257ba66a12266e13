use chrono::Duration;
use mindcare_core::views::{
    self, AdminAppointments, AdminClients, AdminConsultations, AdminStats, AppointmentAction,
    ClientDashboard, ProfileEditor, StatusFilter,
};
use mindcare_core::{Identity, Portal, PortalConfig, PortalError, Registration};
use mindcare_gateway::{Gateway, GatewayError, InMemoryGateway};
use mindcare_model::{
    AppointmentStatus, BookingForm, Collection, ConsultationForm,
    ConsultationStatus, LoginForm, Priority, RegistrationForm, Role,
};
use mindcare_test_utils::{seed, seeded_gateway, today, Fixture, ADMIN_EMAIL, CLIENT_EMAIL, OTHER_CLIENT_EMAIL, PASSWORD};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

async fn signed_in(fixture: &Fixture, email: &str) -> Portal {
    let portal = Portal::new(PortalConfig::default(), fixture.gateway.clone());
    portal.start().await.unwrap();
    portal
        .sign_in(&LoginForm {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    portal
}

fn booking(date: &str, time: &str) -> BookingForm {
    BookingForm {
        appointment_date: date.to_string(),
        appointment_time: time.to_string(),
        notes: String::new(),
    }
}

fn consultation(priority: Priority) -> ConsultationForm {
    ConsultationForm {
        subject: "Trouble sleeping".to_string(),
        message: "I have been waking up at 3am every night for a month.".to_string(),
        priority,
    }
}

#[tokio::test]
async fn booking_creates_pending_appointment_for_caller() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;

    let appointment = views::booking::book(&client, &booking("2030-01-01", "09:00"), today())
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.notes, None);
    assert_eq!(appointment.client_id, fixture.client);
    assert_eq!(appointment.appointment_time.to_string(), "09:00");
}

#[tokio::test]
async fn past_dates_and_lunch_slots_are_refused() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;

    let err = views::booking::book(&client, &booking("2026-10-15", "12:30"), today())
        .await
        .unwrap_err();
    let PortalError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.message_for("appointment_date"), Some("Date cannot be in the past"));
    assert_eq!(errors.message_for("appointment_time"), Some("Please select an available time slot"));
    assert_eq!(fixture.gateway.len(Collection::Appointments), 0);
}

#[tokio::test]
async fn admin_confirmation_is_visible_to_owner() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;
    let admin = signed_in(&fixture, ADMIN_EMAIL).await;

    let booked = views::booking::book(&client, &booking("2030-01-01", "10:30"), today())
        .await
        .unwrap();

    let mut manager = AdminAppointments::new();
    manager.load(&admin).await.unwrap();
    let confirmed = manager
        .act(&admin, booked.id.0, AppointmentAction::Confirm)
        .await
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let mut dashboard = ClientDashboard::new();
    dashboard.load(&client).await.unwrap();
    assert_eq!(dashboard.appointments.items()[0].status, AppointmentStatus::Confirmed);

    let account = admin.session().account().unwrap();
    let err = admin
        .gateway()
        .update(&account.session, Collection::Appointments, booked.id.0, json!({ "status": "pending" }))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::PolicyViolation(_)));
}

#[tokio::test]
async fn illegal_actions_fail_before_the_write() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;
    let admin = signed_in(&fixture, ADMIN_EMAIL).await;
    let booked = views::booking::book(&client, &booking("2030-01-02", "14:00"), today())
        .await
        .unwrap();

    let mut manager = AdminAppointments::new();
    manager.load(&admin).await.unwrap();
    manager.act(&admin, booked.id.0, AppointmentAction::Cancel).await.unwrap();

    let err = manager
        .act(&admin, booked.id.0, AppointmentAction::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Transition(_)));
    assert!(err.is_recoverable());

    let held = manager.list.get(booked.id.0).unwrap();
    assert_eq!(held.appointment.status, AppointmentStatus::Cancelled);
    assert_eq!(held.client.as_ref().unwrap().full_name, "Ada Client");
}

#[tokio::test]
async fn status_tabs_filter_the_listing() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;
    let admin = signed_in(&fixture, ADMIN_EMAIL).await;

    let first = views::booking::book(&client, &booking("2030-01-03", "09:00"), today()).await.unwrap();
    views::booking::book(&client, &booking("2030-01-01", "09:30"), today()).await.unwrap();

    let mut manager = AdminAppointments::new();
    manager.load(&admin).await.unwrap();
    manager.act(&admin, first.id.0, AppointmentAction::Confirm).await.unwrap();

    let dates: Vec<_> = manager
        .visible()
        .iter()
        .map(|row| row.appointment.appointment_date.to_string())
        .collect();
    assert_eq!(dates, vec!["2030-01-01", "2030-01-03"]);

    manager.filter = StatusFilter::Confirmed;
    assert_eq!(manager.visible().len(), 1);
    manager.filter = StatusFilter::Completed;
    assert!(manager.visible().is_empty());
}

#[tokio::test]
async fn consultation_is_triaged_and_resolved() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;
    let admin = signed_in(&fixture, ADMIN_EMAIL).await;

    let request = views::consultation::submit(&client, &consultation(Priority::Urgent))
        .await
        .unwrap();
    assert_eq!(request.status, ConsultationStatus::Pending);
    assert_eq!(request.admin_response, None);
    assert_eq!(request.priority, Priority::Urgent);

    let mut triage = AdminConsultations::new();
    triage.load(&admin).await.unwrap();

    let err = triage.respond(&admin, request.id.0, "   ").await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));

    let started = triage.mark_in_progress(&admin, request.id.0).await.unwrap();
    assert_eq!(started.status, ConsultationStatus::InProgress);

    let resolved = triage
        .respond(&admin, request.id.0, "Please book a session this week.")
        .await
        .unwrap();
    assert_eq!(resolved.status, ConsultationStatus::Resolved);
    assert_eq!(resolved.admin_response.as_deref(), Some("Please book a session this week."));

    let held = &triage.list.items()[0];
    assert_eq!(held.request, resolved);
    assert_eq!(held.client.as_ref().unwrap().email, CLIENT_EMAIL);

    let err = triage.mark_in_progress(&admin, request.id.0).await.unwrap_err();
    assert!(matches!(err, PortalError::Transition(_)));
}

#[tokio::test]
async fn short_consultation_is_rejected_locally() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;

    let form = ConsultationForm {
        subject: "Hi".to_string(),
        message: "Too short".to_string(),
        priority: Priority::default(),
    };
    let err = views::consultation::submit(&client, &form).await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
    assert_eq!(fixture.gateway.len(Collection::ConsultationRequests), 0);
}

#[tokio::test]
async fn clients_cannot_open_admin_views() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;

    let err = AdminStats::load(&client, today()).await.unwrap_err();
    assert!(matches!(err, PortalError::Authorization { .. }));
    assert!(err.notice().is_none());

    let mut clients = AdminClients::new();
    assert!(clients.load(&client).await.is_err());
}

#[tokio::test]
async fn admin_stats_count_the_practice() {
    let fixture = seeded_gateway();
    let ada = signed_in(&fixture, CLIENT_EMAIL).await;
    let bob = signed_in(&fixture, OTHER_CLIENT_EMAIL).await;
    let admin = signed_in(&fixture, ADMIN_EMAIL).await;

    let todays = views::booking::book(&ada, &booking("2026-10-16", "09:00"), today()).await.unwrap();
    let cancelled = views::booking::book(&bob, &booking("2026-10-16", "11:00"), today()).await.unwrap();
    views::booking::book(&bob, &booking("2026-11-01", "15:30"), today()).await.unwrap();
    views::consultation::submit(&ada, &consultation(Priority::Low)).await.unwrap();

    let mut manager = AdminAppointments::new();
    manager.load(&admin).await.unwrap();
    manager.act(&admin, todays.id.0, AppointmentAction::Confirm).await.unwrap();
    manager.act(&admin, cancelled.id.0, AppointmentAction::Cancel).await.unwrap();

    let stats = AdminStats::load(&admin, today()).await.unwrap();
    assert_eq!(
        stats,
        AdminStats {
            total_clients: 2,
            pending_appointments: 1,
            pending_consultations: 1,
            todays_appointments: 1,
        }
    );
}

#[tokio::test]
async fn client_directory_lists_newest_first() {
    let fixture = seeded_gateway();
    let admin = signed_in(&fixture, ADMIN_EMAIL).await;

    let mut directory = AdminClients::new();
    directory.load(&admin).await.unwrap();

    let names: Vec<_> = directory.list.items().iter().map(|p| p.full_name.as_str()).collect();
    assert_eq!(names, vec!["Bob Client", "Ada Client"]);
    assert!(directory.list.items().iter().all(|p| p.role == Role::Client));

    let selected = directory.select(fixture.client).unwrap();
    assert_eq!(selected.email, CLIENT_EMAIL);
    assert!(directory.select(fixture.admin).is_none());
    assert!(directory.selected().is_none());
}

#[tokio::test]
async fn dashboard_shows_five_soonest_and_newest() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;

    for day in (1..=7).rev() {
        let date = format!("2030-02-{day:02}");
        views::booking::book(&client, &booking(&date, "16:00"), today()).await.unwrap();
    }
    for _ in 0..6 {
        views::consultation::submit(&client, &consultation(Priority::Medium)).await.unwrap();
    }
    let other = signed_in(&fixture, OTHER_CLIENT_EMAIL).await;
    views::booking::book(&other, &booking("2030-01-01", "09:00"), today()).await.unwrap();

    let mut dashboard = ClientDashboard::new();
    dashboard.load(&client).await.unwrap();

    let dates: Vec<_> = dashboard
        .appointments
        .items()
        .iter()
        .map(|a| a.appointment_date.to_string())
        .collect();
    assert_eq!(dates, vec!["2030-02-01", "2030-02-02", "2030-02-03", "2030-02-04", "2030-02-05"]);

    let created: Vec<_> = dashboard.consultations.items().iter().map(|c| c.created_at).collect();
    assert_eq!(created.len(), 5);
    assert!(created.windows(2).all(|w| w[0] > w[1]));
}

#[tokio::test]
async fn profile_update_refreshes_cached_profile() {
    let fixture = seeded_gateway();
    let client = signed_in(&fixture, CLIENT_EMAIL).await;

    let mut editor = ProfileEditor::open(&client).unwrap();
    assert_eq!(editor.form.full_name, "Ada Client");
    editor.form.full_name = "Ada Lovelace".to_string();
    editor.form.phone = "555-0100".to_string();
    editor.form.date_of_birth = "1990-12-10".to_string();

    let saved = editor.save(&client).await.unwrap();
    assert_eq!(saved.full_name, "Ada Lovelace");
    assert_eq!(saved.role, Role::Client);
    assert_eq!(saved.emergency_contact, None);

    let Identity::Authenticated(cached) = client.session().current_identity() else {
        panic!("expected signed-in identity");
    };
    assert_eq!(cached, saved);
}

#[tokio::test]
async fn registration_signs_in_new_client() {
    let fixture = seeded_gateway();
    let portal = Portal::new(PortalConfig::default(), fixture.gateway.clone());
    portal.start().await.unwrap();

    let form = RegistrationForm {
        full_name: "Cleo Client".to_string(),
        email: "cleo@example.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    };
    let Registration::SignedIn(profile) = portal.register(&form).await.unwrap() else {
        panic!("expected immediate sign-in");
    };
    assert_eq!(profile.role, Role::Client);
    assert_eq!(profile.full_name, "Cleo Client");

    let err = portal.register(&form).await.unwrap_err();
    assert_eq!(err.notice().as_deref(), Some("An account with this email already exists"));
}

#[tokio::test]
async fn registration_waits_for_email_confirmation() {
    let fixture = seed(InMemoryGateway::new().with_email_confirmation());
    let portal = Portal::new(PortalConfig::default(), fixture.gateway.clone());
    portal.start().await.unwrap();

    let form = RegistrationForm {
        full_name: "Cleo Client".to_string(),
        email: "cleo@example.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    };
    let outcome = portal.register(&form).await.unwrap();
    assert_eq!(
        outcome,
        Registration::ConfirmationPending {
            email: "cleo@example.com".to_string()
        }
    );
    assert_eq!(portal.session().current_identity(), Identity::Anonymous);
    let profiles = fixture.gateway.len(Collection::Profiles);

    // first sign-in after confirmation creates the profile row
    let login = LoginForm {
        email: form.email.clone(),
        password: form.password.clone(),
    };
    let (profile, home) = portal.sign_in(&login).await.unwrap();
    assert_eq!(profile.role, Role::Client);
    assert_eq!(profile.full_name, "Cleo Client");
    assert_eq!(profile.email, "cleo@example.com");
    assert_eq!(home, mindcare_core::Route::Dashboard);
    assert_eq!(portal.session().current_identity(), Identity::Authenticated(profile.clone()));
    assert_eq!(fixture.gateway.len(Collection::Profiles), profiles + 1);

    // later sign-ins reuse it
    portal.sign_out().await;
    let (again, _) = portal.sign_in(&login).await.unwrap();
    assert_eq!(again, profile);
    assert_eq!(fixture.gateway.len(Collection::Profiles), profiles + 1);
}

#[tokio::test]
async fn mismatched_passwords_are_caught_locally() {
    let gateway = Arc::new(InMemoryGateway::new());
    let portal = Portal::new(PortalConfig::default(), gateway.clone());
    portal.start().await.unwrap();

    let form = RegistrationForm {
        full_name: "C".to_string(),
        email: "cleo@example.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret2".to_string(),
    };
    let Err(PortalError::Validation(errors)) = portal.register(&form).await else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.message_for("confirm_password"), Some("Passwords don't match"));
    assert!(errors.message_for("full_name").is_some());
    assert!(gateway.is_empty());
}

#[tokio::test]
async fn short_lived_sessions_expire_mid_use() {
    let fixture = seed(InMemoryGateway::new().with_session_ttl(Duration::milliseconds(-1)));
    let portal = Portal::new(PortalConfig::default(), fixture.gateway.clone());
    portal.start().await.unwrap();

    let err = portal
        .sign_in(&LoginForm {
            email: CLIENT_EMAIL.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert!(!err.is_recoverable());
    assert_eq!(portal.session().current_identity(), Identity::Anonymous);
    assert_eq!(fixture.gateway.current_session().await.unwrap(), None);
}
