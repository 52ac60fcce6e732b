mod routes;
pub mod timetable;
pub mod attendance;
pub mod state;
pub mod storage;
pub mod services;
pub mod notify;
pub mod config;
pub mod error;
mod logging;

use std::sync::Arc;

// Re-export test modules
#[cfg(test)]
#[path = "../tests/unit/error_test.rs"]
mod error_test;


#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize structured logging first
    logging::init_logging();
    tracing::info!("classtrack application starting");

    // Initialize async runtime for startup tasks
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| error::TrackError::new(
            format!("Failed to create async runtime: {}", e),
            "startup"
        ))
        .expect("Failed to create async runtime");

    // Hydrate the whole persisted state once
    let model = rt.block_on(storage::load());
    tracing::info!(
        setup_completed = model.setup_completed,
        reminders_enabled = model.notifications.enabled,
        "State hydrated"
    );

    let app_state = Arc::new(state::app::AppState::new(model));
    let scheduler_state = app_state.clone();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(app_state.clone())
        .setup(move |app| {
            // Resume the reminder loop if it was enabled before shutdown
            if scheduler_state.read(|m| m.notifications.enabled) {
                let handle = notify::scheduler::start(
                    app.handle().clone(),
                    scheduler_state.as_ref().clone(),
                );
                scheduler_state.replace_scheduler(Some(handle));
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            routes::get_app_snapshot,
            routes::get_day_view,
            routes::select_date,
            routes::set_schedule,
            routes::set_recurring_holidays,
            routes::copy_template_to_day,
            routes::mark_attendance,
            routes::mark_holiday,
            routes::unmark_holiday,
            routes::apply_override,
            routes::upload_timetable_image,
            routes::parser_backend_reachable,
            routes::month_report,
            routes::search_report,
            routes::list_holidays,
            routes::get_subjects,
            routes::configure_reminder,
            routes::disable_reminders,
            routes::send_test_notification,
            routes::complete_setup,
            routes::reset_app
        ])
        .run(tauri::generate_context!())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to run Tauri application");
            e
        })
        .expect("error while running tauri application");
}
