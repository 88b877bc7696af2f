use crate::infra::{next_monday, InMemoryBackend};
use chrono::{Local, NaiveDate};
use clap::Args;
use staffdesk::config::SubstitutionConfig;
use staffdesk::error::AppError;
use staffdesk::workflows::substitution::{
    AbsenceReport, FacultyId, RepositoryError, ScheduleSlot, SubstitutionService,
    SubstitutionServiceError, Weekday,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Monday to report absences for (YYYY-MM-DD). Defaults to the next Monday.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Override the department affinity bonus.
    #[arg(long)]
    pub(crate) affinity_bonus: Option<i32>,
    /// Override the per-substitution load penalty.
    #[arg(long)]
    pub(crate) load_penalty: Option<i32>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        affinity_bonus,
        load_penalty,
    } = args;

    let date = date.unwrap_or_else(|| next_monday(Local::now().date_naive()));
    let defaults = SubstitutionConfig::default();
    let config = SubstitutionConfig {
        affinity_bonus: affinity_bonus.unwrap_or(defaults.affinity_bonus),
        load_penalty: load_penalty.unwrap_or(defaults.load_penalty),
        max_active_load: None,
    };

    println!("Substitute assignment demo for {}", date.format("%A %Y-%m-%d"));
    println!(
        "Scoring: +{} same department, -{} per active substitution",
        config.affinity_bonus, config.load_penalty
    );

    println!("\nScenario A: CS lecturer absent, CS and Math colleagues free");
    let backend = InMemoryBackend::new();
    backend.seed_sample_roster().map_err(to_app_error)?;
    let service = backend.service(&config);
    report_and_render(&service, &backend, "f1", date)?;

    println!("\nScenario B: the CS colleague already covers four classes");
    let backend = InMemoryBackend::new();
    backend.seed_sample_roster().map_err(to_app_error)?;
    let service = backend.service(&config);
    preload_substitutions(&service, &backend, "f2", 4, date)?;
    report_and_render(&service, &backend, "f1", date)?;

    println!("\nScenario C: nobody is free at the requested slot");
    let backend = InMemoryBackend::new();
    backend.seed_sample_roster().map_err(to_app_error)?;
    let service = backend.service(&config);
    for uid in ["f2", "f3"] {
        service.save_schedule(
            &FacultyId::new(uid),
            vec![ScheduleSlot::class(Weekday::Monday, "09:00", "10:00", "Seminar")],
        )?;
    }
    report_and_render(&service, &backend, "f1", date)?;

    Ok(())
}

fn to_app_error(err: RepositoryError) -> AppError {
    AppError::from(SubstitutionServiceError::from(err))
}

/// Gives `uid` `count` active assignments by letting stand-in lecturers report absences
/// at a slot only `uid` is free for.
fn preload_substitutions(
    service: &SubstitutionService,
    backend: &InMemoryBackend,
    uid: &str,
    count: usize,
    date: NaiveDate,
) -> Result<(), AppError> {
    let mut slots = service
        .schedule(&FacultyId::new(uid))?
        .map(|schedule| schedule.slots)
        .unwrap_or_default();
    slots.push(ScheduleSlot::leisure(Weekday::Monday, "15:00", "16:00"));
    service.save_schedule(&FacultyId::new(uid), slots)?;

    for index in 0..count {
        let stand_in = format!("visiting-{index}");
        backend
            .enroll(
                &stand_in,
                &format!("Visiting Lecturer {}", index + 1),
                "Visiting",
                vec![ScheduleSlot::class(Weekday::Monday, "15:00", "16:00", "Guest Lecture")],
            )
            .map_err(to_app_error)?;
        service.report_absence(AbsenceReport {
            faculty_uid: FacultyId::new(stand_in),
            date,
            start_time: "15:00".to_string(),
            end_time: "16:00".to_string(),
            reason: Some("Travel".to_string()),
        })?;
    }

    let load = service.substitutions_for(&FacultyId::new(uid))?.len();
    println!("- {uid} now covers {load} active substitution(s)");
    Ok(())
}

fn report_and_render(
    service: &SubstitutionService,
    backend: &InMemoryBackend,
    uid: &str,
    date: NaiveDate,
) -> Result<(), AppError> {
    let notifications_before = backend.notifications.events().len();
    let audit_before = backend.audit.entries().len();

    let outcome = service.report_absence(AbsenceReport {
        faculty_uid: FacultyId::new(uid),
        date,
        start_time: "09:00".to_string(),
        end_time: "10:00".to_string(),
        reason: Some("Medical appointment".to_string()),
    })?;
    let absence = service.absence(&outcome.absence_id)?;

    println!(
        "- Absence {} for {} -> status {}",
        absence.id,
        absence.faculty_name,
        absence.status.label()
    );

    match &outcome.substitution_id {
        Some(id) => match service.substitution(id)? {
            Some(substitution) => println!(
                "  Substitute: {} ({}) via {}",
                substitution.substitute_name, substitution.substitute_faculty_id, id
            ),
            None => println!("  Substitution {id} could not be read back"),
        },
        None => println!("  No substitute available; absence left pending"),
    }

    let notifications = backend.notifications.events();
    if notifications.len() == notifications_before {
        println!("  Notifications: none sent");
    } else {
        println!("  Notifications:");
        for event in &notifications[notifications_before..] {
            println!("    - to {}: {} | {}", event.user_id, event.title, event.message);
        }
    }

    for entry in backend.audit.entries().iter().skip(audit_before) {
        println!("  Audit: {}", entry.details);
    }

    Ok(())
}
