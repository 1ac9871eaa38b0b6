use std::sync::Arc;

use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{PlannerError, RemoteError};
use crate::planning::intent::PaintIntent;
use crate::planning::types::{AnalystId, AssignmentKey, TeamId};
use crate::planning::{coverage, load_view, render_grid, ViewLength, ViewWindow};
use crate::remote::http::ADMIN_PASSWORD_HEADER;
use crate::remote::{MemoryStore, PlanningRemote};

/// Shared server state
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct TeamQuery {
    team: Option<TeamId>,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    start: NaiveDate,
    end: NaiveDate,
    team: Option<TeamId>,
}

#[derive(Deserialize)]
pub struct ViewQuery {
    start: NaiveDate,
    days: Option<u32>,
    team: Option<TeamId>,
}

impl ViewQuery {
    fn window(&self) -> Result<ViewWindow, &'static str> {
        let length = ViewLength::from_days(self.days.unwrap_or(7)).ok_or("days must be 7 or 15")?;
        ViewWindow::new(self.start, length).ok_or("start is out of the supported date range")
    }
}

fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({"success": false, "error": message.into()})
}

fn remote_error_response(err: &RemoteError) -> HttpResponse {
    match err {
        RemoteError::NotFound => HttpResponse::NotFound().json(error_body("Not found")),
        RemoteError::Rejected { status: 422, message } => {
            HttpResponse::UnprocessableEntity().json(error_body(message.clone()))
        }
        other => HttpResponse::InternalServerError().json(error_body(other.to_string())),
    }
}

fn authorized(req: &HttpRequest, state: &AppState) -> bool {
    let password = req
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    password == state.admin_password
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(error_body("Unauthorized"))
}

async fn list_teams(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(match state.store.list_teams().await {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(err) => remote_error_response(&err),
    })
}

async fn list_concepts(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(match state.store.list_concepts().await {
        Ok(concepts) => HttpResponse::Ok().json(concepts),
        Err(err) => remote_error_response(&err),
    })
}

async fn list_clusters(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(match state.store.list_clusters().await {
        Ok(clusters) => HttpResponse::Ok().json(clusters),
        Err(err) => remote_error_response(&err),
    })
}

async fn list_analysts(
    query: web::Query<TeamQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(match state.store.list_analysts(query.team).await {
        Ok(analysts) => HttpResponse::Ok().json(analysts),
        Err(err) => remote_error_response(&err),
    })
}

async fn list_assignments(
    query: web::Query<RangeQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if query.end < query.start {
        return Ok(HttpResponse::BadRequest().json(error_body("end must not be before start")));
    }
    Ok(match state.store.list_assignments(query.start, query.end, query.team).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => remote_error_response(&err),
    })
}

// Upsert keyed by (analystId, date)
async fn put_assignment(
    req: HttpRequest,
    body: web::Json<PaintIntent>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !authorized(&req, &state) {
        return Ok(unauthorized());
    }
    match state.store.put_assignment(&body).await {
        Ok(saved) => {
            info!(analyst_id = saved.analyst_id, date = %saved.date, code = %saved.concept.code, "assignment stored");
            Ok(HttpResponse::Ok().json(saved))
        }
        Err(err) => {
            warn!(analyst_id = body.analyst_id, date = %body.date, error = %err, "assignment rejected");
            Ok(remote_error_response(&err))
        }
    }
}

async fn delete_assignment(
    req: HttpRequest,
    path: web::Path<(AnalystId, NaiveDate)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !authorized(&req, &state) {
        return Ok(unauthorized());
    }
    let (analyst_id, date) = path.into_inner();
    match state.store.delete_assignment(AssignmentKey::new(analyst_id, date)).await {
        Ok(()) => {
            info!(analyst_id, date = %date, "assignment deleted");
            Ok(HttpResponse::NoContent().finish())
        }
        Err(err) => Ok(remote_error_response(&err)),
    }
}

fn view_error_response(err: &PlannerError) -> HttpResponse {
    match err {
        PlannerError::Read { source, .. } => remote_error_response(source),
        other => HttpResponse::InternalServerError().json(error_body(other.to_string())),
    }
}

// Rendered analyst x day matrix
async fn get_grid(query: web::Query<ViewQuery>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let window = match query.window() {
        Ok(window) => window,
        Err(message) => return Ok(HttpResponse::BadRequest().json(error_body(message))),
    };
    Ok(match load_view(&*state.store, &window, query.team).await {
        Ok(view) => HttpResponse::Ok().json(render_grid(&view.analysts, &view.store, &window)),
        Err(err) => view_error_response(&err),
    })
}

// Per-day coverage of a view
async fn get_stats(query: web::Query<ViewQuery>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let window = match query.window() {
        Ok(window) => window,
        Err(message) => return Ok(HttpResponse::BadRequest().json(error_body(message))),
    };
    Ok(match load_view(&*state.store, &window, query.team).await {
        Ok(view) => {
            let grid = render_grid(&view.analysts, &view.store, &window);
            HttpResponse::Ok().json(coverage(&grid))
        }
        Err(err) => view_error_response(&err),
    })
}

/// Registers the API routes; the caller provides `web::Data<AppState>`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/teams", web::get().to(list_teams))
        .route("/api/concepts", web::get().to(list_concepts))
        .route("/api/clusters", web::get().to(list_clusters))
        .route("/api/analysts", web::get().to(list_analysts))
        .route("/api/assignments", web::get().to(list_assignments))
        .route("/api/assignments", web::put().to(put_assignment))
        .route("/api/assignments", web::post().to(put_assignment))
        .service(
            web::resource("/api/assignments/{analyst_id}/{date}")
                .route(web::delete().to(delete_assignment)),
        )
        .route("/api/grid", web::get().to(get_grid))
        .route("/api/stats", web::get().to(get_stats));
}

pub async fn start_server(port: u16, admin_password: String, store: Arc<MemoryStore>) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        store,
        admin_password,
    });

    info!(port, "starting planning server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::types::fixtures::*;
    use crate::planning::types::{ShiftAssignment, Team};
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn state() -> web::Data<AppState> {
        let store = MemoryStore::new(
            vec![Team {
                id: 1,
                name: "Soporte".into(),
            }],
            vec![t1(), t2(), off()],
            vec![cluster(3, "#3366ff")],
            vec![analyst(5, "Ana"), analyst(7, "Luis")],
        );
        web::Data::new(AppState {
            store: Arc::new(store),
            admin_password: "secret".into(),
        })
    }

    fn paint_body() -> serde_json::Value {
        serde_json::json!({
            "analystId": 7,
            "date": "2024-03-11",
            "conceptId": 1,
            "clusterId": 3,
            "startTime": "08:00",
            "endTime": "18:00"
        })
    }

    #[actix_web::test]
    async fn writes_require_the_admin_password() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::put()
            .uri("/api/assignments")
            .set_json(paint_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn put_then_query_then_delete() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;

        let req = test::TestRequest::put()
            .uri("/api/assignments")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .set_json(paint_body())
            .to_request();
        let saved: ShiftAssignment = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.cluster.map(|c| c.id), Some(3));

        let req = test::TestRequest::get()
            .uri("/api/assignments?start=2024-03-10&end=2024-03-16")
            .to_request();
        let rows: Vec<ShiftAssignment> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 1);

        let req = test::TestRequest::delete()
            .uri("/api/assignments/7/2024-03-11")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete()
            .uri("/api/assignments/7/2024-03-11")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_write_is_unprocessable() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let mut body = paint_body();
        body["conceptId"] = serde_json::json!(3);
        let req = test::TestRequest::put()
            .uri("/api/assignments")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn grid_rejects_unsupported_lengths() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get()
            .uri("/api/grid?start=2024-03-10&days=10")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/grid?start=2024-03-10&days=15")
            .to_request();
        let grid: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(grid["days"].as_array().map(Vec::len), Some(15));
        assert_eq!(grid["rows"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn views_past_the_calendar_end_are_bad_requests() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let start = NaiveDate::MAX.to_string().replace('+', "%2B");
        for path in ["grid", "stats"] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/{path}?start={start}&days=7"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
        }
    }

    #[actix_web::test]
    async fn password_is_never_checked_outside_writes() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({ "password": "secret" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/teams").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
