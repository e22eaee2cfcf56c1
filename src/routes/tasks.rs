use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::TaskInput,
    state::AppState,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Lists the caller's tasks, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects; `[]` when the caller has none.
/// - `401 Unauthorized`: missing or invalid token.
/// - `500 Internal Server Error`: storage failure.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_by_owner(user.user_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the caller.
///
/// ## Request Body:
/// - `title`: required, not blank.
/// - `description` (optional).
///
/// ## Responses:
/// - `201 Created`: the stored `Task`, with its id and status `"pending"`.
/// - `400 Bad Request`: malformed JSON or blank title.
/// - `401 Unauthorized`: missing or invalid token.
/// - `500 Internal Server Error`: storage failure.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = state
        .tasks
        .create(user.user_id, &payload.title, payload.description.as_deref())
        .await?;
    log::info!("Task {} created by {}", task.id, user.username);

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `400 Bad Request`: the id is not an integer.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .get_by_id(task_id.into_inner(), user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the caller's tasks.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `400 Bad Request`: the id is not an integer.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    state.tasks.delete(task_id, user.user_id).await?;
    log::info!("Task {} deleted by {}", task_id, user.username);

    Ok(HttpResponse::NoContent().finish())
}
