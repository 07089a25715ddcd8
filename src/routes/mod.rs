pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::refresh_token),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::update_task_status)
            .service(tasks::get_task)
            .service(tasks::delete_task),
    );
}
