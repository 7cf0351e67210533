mod change_date;
mod create_exam;
mod exam_channel;
mod get_exam;
mod get_exams;
mod get_user_exams;
mod join_exam;
mod membership;
mod sync_exam_reminders;

use actix_web::web;
use change_date::change_date_controller;
use create_exam::create_exam_controller;
use get_exam::get_exam_controller;
use get_exams::get_exams_controller;
use get_user_exams::get_user_exams_controller;
use join_exam::join_exam_controller;

pub use exam_channel::join_exam_channel;
pub use sync_exam_reminders::resolve_reminder_target;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/exams", web::get().to(get_exams_controller));
    cfg.route("/exams", web::post().to(create_exam_controller));
    cfg.route("/exams/{slug}", web::get().to(get_exam_controller));
    cfg.route("/exams/{slug}/join", web::post().to(join_exam_controller));
    cfg.route("/exams/{slug}/date", web::put().to(change_date_controller));
    cfg.route("/me/exams", web::get().to(get_user_exams_controller));
}
