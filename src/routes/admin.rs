//! Back-office JSON API. Every route sits behind Basic auth for
//! administrators and staff.

use actix_web::{http::header, middleware::from_fn, web, HttpRequest, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{admin_validator, logout_guard, AuthUser},
    clock,
    db::{self, stats::DashboardStats},
    error::{AppError, AppResult},
    followup::{self, LeadFilter},
    models::{
        AppointmentDraft, AppointmentRow, AppointmentStatus, BannerDraft, ClientDraft, LeadStatus,
        Review, ServiceDraft, TextEnum,
    },
    routes::events,
    state::{AppState, ServerEvent},
    storage,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(HttpAuthentication::basic(admin_validator))
            .wrap(from_fn(logout_guard))
            .app_data(json_config())
            .app_data(query_config())
            .service(web::resource("").route(web::get().to(index)))
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/dashboard").route(web::get().to(dashboard)))
            .service(
                web::resource("/clients")
                    .route(web::get().to(list_clients))
                    .route(web::post().to(create_client)),
            )
            .service(
                web::resource("/clients/{id}")
                    .route(web::get().to(client_profile))
                    .route(web::put().to(update_client))
                    .route(web::delete().to(delete_client)),
            )
            .service(
                web::resource("/services")
                    .route(web::get().to(list_services))
                    .route(web::post().to(create_service)),
            )
            .service(
                web::resource("/services/{id}")
                    .route(web::put().to(update_service))
                    .route(web::delete().to(delete_service)),
            )
            .service(
                web::resource("/appointments")
                    .route(web::get().to(list_appointments))
                    .route(web::post().to(create_appointment)),
            )
            .service(web::resource("/appointments/options").route(web::get().to(appointment_options)))
            .service(
                web::resource("/appointments/{id}")
                    .route(web::put().to(update_appointment))
                    .route(web::delete().to(delete_appointment)),
            )
            .service(web::resource("/leads").route(web::get().to(list_leads)))
            .service(web::resource("/leads/{id}/status").route(web::put().to(update_lead_status)))
            .service(web::resource("/leads/{id}/follow-up").route(web::put().to(set_follow_up)))
            .service(
                web::resource("/leads/{id}/follow-up/quick").route(web::post().to(quick_follow_up)),
            )
            .service(
                web::resource("/banners")
                    .route(web::get().to(list_banners))
                    .route(web::post().to(create_banner)),
            )
            .service(
                web::resource("/banners/{id}")
                    .route(web::put().to(update_banner))
                    .route(web::delete().to(delete_banner)),
            )
            .service(web::resource("/reviews").route(web::get().to(list_reviews)))
            .service(web::resource("/reviews/{id}").route(web::delete().to(delete_review)))
            .service(web::resource("/reviews/{id}/approve").route(web::post().to(approve_review)))
            .service(web::resource("/uploads").route(web::post().to(upload_image)))
            .service(web::resource("/reports").route(web::get().to(reports)))
            .service(web::resource("/settings").route(web::get().to(settings)))
            .service(web::resource("/events").route(web::get().to(events::stream_events))),
    );
}

/// Malformed bodies and query strings get the same JSON error shape as
/// every other rejected input.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::invalid("body", format!("Invalid request body: {err}")).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::invalid("query", format!("Invalid query string: {err}")).into()
    })
}

async fn index() -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, "/admin/dashboard"))
        .finish()
}

#[derive(Serialize)]
struct DashboardView {
    user: String,
    #[serde(flatten)]
    stats: DashboardStats,
}

async fn dashboard(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
) -> AppResult<HttpResponse> {
    let stats = db::stats::dashboard(&state.db, clock::now_utc(), state.offset())
        .await
        .map_err(AppError::backend("Error fetching dashboard stats"))?;
    Ok(HttpResponse::Ok().json(DashboardView {
        user: auth.display_name.clone(),
        stats,
    }))
}

fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Option<String>,
}

async fn list_clients(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let clients = db::clients::list(&state.db, query.search.as_deref())
        .await
        .map_err(AppError::backend("Error fetching clients"))?;
    Ok(HttpResponse::Ok().json(clients))
}

async fn client_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let profile = db::clients::profile(&state.db, &path)
        .await
        .map_err(AppError::backend("Error fetching client"))?
        .ok_or(AppError::NotFound("Client"))?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn create_client(
    state: web::Data<AppState>,
    body: web::Json<ClientDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().normalize().map_err(AppError::from_fields)?;
    let client = db::clients::insert(&state.db, &draft)
        .await
        .map_err(AppError::backend("Error creating client"))?;
    log::info!("Client {} created", client.id);
    Ok(HttpResponse::Created().json(client))
}

async fn update_client(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ClientDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().normalize().map_err(AppError::from_fields)?;
    let client = db::clients::update(&state.db, &path, &draft)
        .await
        .map_err(AppError::backend("Error updating client"))?
        .ok_or(AppError::NotFound("Client"))?;
    Ok(HttpResponse::Ok().json(client))
}

async fn delete_client(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deleted = db::clients::delete(&state.db, &path)
        .await
        .map_err(AppError::backend("Error deleting client"))?;
    if !deleted {
        return Err(AppError::NotFound("Client"));
    }
    log::info!("Client {} deleted", path.as_str());
    Ok(no_content())
}

async fn list_services(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let services = db::services::list(&state.db)
        .await
        .map_err(AppError::backend("Error fetching services"))?;
    Ok(HttpResponse::Ok().json(services))
}

async fn create_service(
    state: web::Data<AppState>,
    body: web::Json<ServiceDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().normalize().map_err(AppError::from_fields)?;
    let service = db::services::insert(&state.db, &draft)
        .await
        .map_err(AppError::backend("Error creating service"))?;
    log::info!("Service {} created", service.id);
    Ok(HttpResponse::Created().json(service))
}

async fn update_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ServiceDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().normalize().map_err(AppError::from_fields)?;
    let service = db::services::update(&state.db, &path, &draft)
        .await
        .map_err(AppError::backend("Error updating service"))?
        .ok_or(AppError::NotFound("Service"))?;
    Ok(HttpResponse::Ok().json(service))
}

async fn delete_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deleted = db::services::delete(&state.db, &path)
        .await
        .map_err(AppError::backend("Error deleting service"))?;
    if !deleted {
        return Err(AppError::NotFound("Service"));
    }
    log::info!("Service {} deleted", path.as_str());
    Ok(no_content())
}

#[derive(Deserialize)]
struct AppointmentFilter {
    status: Option<String>,
}

impl AppointmentFilter {
    fn status(&self) -> AppResult<Option<AppointmentStatus>> {
        AppointmentStatus::from_filter("status", self.status.as_deref())
    }
}

async fn list_appointments(
    state: web::Data<AppState>,
    query: web::Query<AppointmentFilter>,
) -> AppResult<HttpResponse> {
    let appointments = db::appointments::list(&state.db, query.status()?)
        .await
        .map_err(AppError::backend("Error fetching appointments"))?;
    let rows: Vec<AppointmentRow> = appointments.into_iter().map(AppointmentRow::from).collect();
    Ok(HttpResponse::Ok().json(rows))
}

async fn appointment_options(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let options = db::appointments::form_options(&state.db)
        .await
        .map_err(AppError::backend("Error fetching appointment options"))?;
    Ok(HttpResponse::Ok().json(options))
}

async fn create_appointment(
    state: web::Data<AppState>,
    auth: web::ReqData<AuthUser>,
    body: web::Json<AppointmentDraft>,
) -> AppResult<HttpResponse> {
    let draft = body
        .into_inner()
        .normalize(state.offset())
        .map_err(AppError::from_fields)?;
    let appointment = db::appointments::insert(&state.db, &draft, Some(&auth.id))
        .await
        .map_err(AppError::backend("Error creating appointment"))?;

    log::info!(
        "{} booked appointment {}",
        auth.display_name,
        appointment.appointment.id
    );
    state.publish(ServerEvent::appointment("appointment_created", &appointment));
    Ok(HttpResponse::Created().json(AppointmentRow::from(appointment)))
}

async fn update_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AppointmentDraft>,
) -> AppResult<HttpResponse> {
    let draft = body
        .into_inner()
        .normalize(state.offset())
        .map_err(AppError::from_fields)?;
    let appointment = db::appointments::update(&state.db, &path, &draft)
        .await
        .map_err(AppError::backend("Error updating appointment"))?
        .ok_or(AppError::NotFound("Appointment"))?;

    state.publish(ServerEvent::appointment("appointment_updated", &appointment));
    Ok(HttpResponse::Ok().json(AppointmentRow::from(appointment)))
}

async fn delete_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deleted = db::appointments::delete(&state.db, &path)
        .await
        .map_err(AppError::backend("Error deleting appointment"))?;
    if !deleted {
        return Err(AppError::NotFound("Appointment"));
    }
    Ok(no_content())
}

async fn list_leads(
    state: web::Data<AppState>,
    query: web::Query<LeadFilter>,
) -> AppResult<HttpResponse> {
    let leads = db::leads::list(&state.db)
        .await
        .map_err(AppError::backend("Error fetching leads"))?;
    let rows = followup::prepare(leads, &query, clock::now_utc(), state.offset())?;
    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Deserialize)]
struct LeadStatusBody {
    status: LeadStatus,
}

async fn update_lead_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LeadStatusBody>,
) -> AppResult<HttpResponse> {
    let lead = db::leads::update_status(&state.db, &path, body.status)
        .await
        .map_err(AppError::backend("Error updating lead status"))?
        .ok_or(AppError::NotFound("Lead"))?;
    Ok(HttpResponse::Ok().json(lead))
}

#[derive(Deserialize)]
struct FollowUpBody {
    follow_up_date: Option<String>,
}

async fn set_follow_up(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<FollowUpBody>,
) -> AppResult<HttpResponse> {
    let follow_up = match body.follow_up_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(
            clock::parse_form_datetime(value, state.offset()).ok_or_else(|| {
                AppError::invalid("follow_up_date", "Please pick a valid follow-up date")
            })?,
        ),
    };

    let lead = db::leads::set_follow_up(&state.db, &path, follow_up)
        .await
        .map_err(AppError::backend("Error updating follow-up date"))?
        .ok_or(AppError::NotFound("Lead"))?;
    Ok(HttpResponse::Ok().json(lead))
}

#[derive(Deserialize)]
struct QuickFollowUpBody {
    days: i64,
}

async fn quick_follow_up(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<QuickFollowUpBody>,
) -> AppResult<HttpResponse> {
    if !(1..=365).contains(&body.days) {
        return Err(AppError::invalid("days", "Days must be between 1 and 365"));
    }
    let at = followup::quick_follow_up(clock::now_utc(), body.days);
    let lead = db::leads::set_follow_up(&state.db, &path, Some(at))
        .await
        .map_err(AppError::backend("Error updating follow-up date"))?
        .ok_or(AppError::NotFound("Lead"))?;
    Ok(HttpResponse::Ok().json(lead))
}

async fn list_banners(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let banners = db::banners::list(&state.db)
        .await
        .map_err(AppError::backend("Error fetching banners"))?;
    Ok(HttpResponse::Ok().json(banners))
}

async fn create_banner(
    state: web::Data<AppState>,
    body: web::Json<BannerDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().normalize().map_err(AppError::from_fields)?;
    let banner = db::banners::insert(&state.db, &draft)
        .await
        .map_err(AppError::backend("Error creating banner"))?;
    Ok(HttpResponse::Created().json(banner))
}

async fn update_banner(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<BannerDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner().normalize().map_err(AppError::from_fields)?;
    let banner = db::banners::update(&state.db, &path, &draft)
        .await
        .map_err(AppError::backend("Error updating banner"))?
        .ok_or(AppError::NotFound("Banner"))?;
    Ok(HttpResponse::Ok().json(banner))
}

async fn delete_banner(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deleted = db::banners::delete(&state.db, &path)
        .await
        .map_err(AppError::backend("Error deleting banner"))?;
    if !deleted {
        return Err(AppError::NotFound("Banner"));
    }
    Ok(no_content())
}

#[derive(Serialize)]
struct ReviewQueues {
    pending: Vec<Review>,
    approved: Vec<Review>,
}

async fn list_reviews(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let reviews = db::reviews::list(&state.db)
        .await
        .map_err(AppError::backend("Error fetching reviews"))?;
    let (approved, pending): (Vec<Review>, Vec<Review>) =
        reviews.into_iter().partition(|review| review.is_approved);
    Ok(HttpResponse::Ok().json(ReviewQueues { pending, approved }))
}

async fn approve_review(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let review = db::reviews::approve(&state.db, &path)
        .await
        .map_err(AppError::backend("Error approving review"))?
        .ok_or(AppError::NotFound("Review"))?;
    log::info!("Review {} approved", review.id);
    Ok(HttpResponse::Ok().json(review))
}

async fn delete_review(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deleted = db::reviews::delete(&state.db, &path)
        .await
        .map_err(AppError::backend("Error deleting review"))?;
    if !deleted {
        return Err(AppError::NotFound("Review"));
    }
    Ok(no_content())
}

#[derive(Serialize)]
struct Uploaded {
    url: String,
}

async fn upload_image(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let url = storage::upload(
        &state.config.upload_dir,
        &body,
        content_type,
        state.config.max_upload_bytes,
    )
    .await?;
    Ok(HttpResponse::Created().json(Uploaded { url }))
}

#[derive(Serialize)]
struct PlannedPage {
    title: &'static str,
    description: &'static str,
    planned: &'static [&'static str],
}

async fn reports() -> HttpResponse {
    HttpResponse::Ok().json(PlannedPage {
        title: "Reports",
        description: "Business analytics are on the way.",
        planned: &[
            "Revenue analytics",
            "Appointment trends",
            "Client retention metrics",
            "Service performance",
            "Monthly/Yearly comparisons",
        ],
    })
}

async fn settings() -> HttpResponse {
    HttpResponse::Ok().json(PlannedPage {
        title: "Settings",
        description: "Configuration options are on the way.",
        planned: &[
            "Business profile settings",
            "Operating hours",
            "Email notifications",
            "Payment gateway configuration",
            "User management",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{PaymentStatus, ReviewDraft},
        test_support::{self, ADMIN_BASIC_AUTH},
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    fn test_app(
        state: AppState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure)
    }

    fn get(uri: &str) -> test::TestRequest {
        test::TestRequest::get().uri(uri).insert_header(ADMIN_BASIC_AUTH)
    }

    fn send_json(method: &str, uri: &str, body: Value) -> test::TestRequest {
        let req = if method == "PUT" {
            test::TestRequest::put()
        } else {
            test::TestRequest::post()
        };
        req.uri(uri).insert_header(ADMIN_BASIC_AUTH).set_json(body)
    }

    fn delete(uri: &str) -> test::TestRequest {
        test::TestRequest::delete().uri(uri).insert_header(ADMIN_BASIC_AUTH)
    }

    #[actix_web::test]
    async fn admin_requires_credentials() {
        let app = test::init_service(test_app(test_support::state().await)).await;

        let req = test::TestRequest::get().uri("/admin/clients").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/admin/clients")
            .insert_header(("Authorization", "Basic YWRtaW46d3Jvbmc="))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_cookie_closes_the_back_office() {
        let app = test::init_service(test_app(test_support::state().await)).await;
        let req = get("/admin/dashboard")
            .cookie(actix_web::cookie::Cookie::new("glow_logged_out", "1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn client_crud_round() {
        let app = test::init_service(test_app(test_support::state().await)).await;

        let created: Value = test::call_and_read_body_json(
            &app,
            send_json("POST", "/admin/clients", json!({"full_name": "Kavya", "phone": "9876543210"}))
                .to_request(),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["email"], Value::Null);

        let updated: Value = test::call_and_read_body_json(
            &app,
            send_json(
                "PUT",
                &format!("/admin/clients/{id}"),
                json!({"full_name": "Kavya Iyer", "email": "kavya@example.com"}),
            )
            .to_request(),
        )
        .await;
        assert_eq!(updated["full_name"], "Kavya Iyer");

        let found: Vec<Value> =
            test::call_and_read_body_json(&app, get("/admin/clients?search=IYER").to_request()).await;
        assert_eq!(found.len(), 1);

        let resp = test::call_service(&app, delete(&format!("/admin/clients/{id}")).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let resp = test::call_service(&app, delete(&format!("/admin/clients/{id}")).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_drafts_are_rejected_with_field_errors() {
        let app = test::init_service(test_app(test_support::state().await)).await;
        let resp = test::call_service(
            &app,
            send_json("POST", "/admin/services", json!({"name": " ", "price": 100.0})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "name");
    }

    #[actix_web::test]
    async fn appointment_lifecycle_publishes_events() {
        let state = test_support::state().await;
        let client = test_support::client(&state.db, "Ritu").await;
        let service = test_support::service(&state.db, "Facial", 600.0).await;
        let mut events = state.events.subscribe();
        let app = test::init_service(test_app(state)).await;

        let resp = test::call_service(
            &app,
            send_json(
                "POST",
                "/admin/appointments",
                json!({
                    "client_id": client.id,
                    "service_id": service.id,
                    "appointment_date": "2026-05-01T10:30",
                }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["appointment_date"], "2026-05-01T05:00:00Z");
        assert_eq!(created["status"], "scheduled");
        assert_eq!(created["client_name"], "Ritu");
        assert!(created["created_by"].is_string());
        let event = events.try_recv().unwrap();
        assert_eq!(event.kind, "appointment_created");
        assert!(event.summary.ends_with("(Scheduled)."));

        let id = created["id"].as_str().unwrap();
        let updated: Value = test::call_and_read_body_json(
            &app,
            send_json(
                "PUT",
                &format!("/admin/appointments/{id}"),
                json!({
                    "client_id": client.id,
                    "service_id": service.id,
                    "appointment_date": "2026-05-01T05:00:00Z",
                    "status": "completed",
                    "payment_amount": 600.0,
                    "payment_status": PaymentStatus::Paid,
                }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(updated["status"], "completed");
        assert_eq!(updated["status_label"], "Completed");
        assert_eq!(updated["payment_status"], "paid");
        assert_eq!(updated["payment_status_label"], "Paid");
        assert_eq!(events.try_recv().unwrap().kind, "appointment_updated");

        let completed: Vec<Value> = test::call_and_read_body_json(
            &app,
            get("/admin/appointments?status=completed").to_request(),
        )
        .await;
        assert_eq!(completed.len(), 1);
        let cancelled: Vec<Value> = test::call_and_read_body_json(
            &app,
            get("/admin/appointments?status=cancelled").to_request(),
        )
        .await;
        assert!(cancelled.is_empty());
    }

    #[actix_web::test]
    async fn appointment_for_unknown_client_conflicts() {
        let state = test_support::state().await;
        let service = test_support::service(&state.db, "Facial", 600.0).await;
        let app = test::init_service(test_app(state)).await;

        let resp = test::call_service(
            &app,
            send_json(
                "POST",
                "/admin/appointments",
                json!({
                    "client_id": "ghost",
                    "service_id": service.id,
                    "appointment_date": "2026-05-01T10:30",
                }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn client_with_appointments_cannot_be_deleted() {
        let state = test_support::state().await;
        let client = test_support::client(&state.db, "Ritu").await;
        let other = test_support::client(&state.db, "Sana").await;
        let service = test_support::service(&state.db, "Facial", 600.0).await;
        test_support::appointment(&state.db, &client.id, &service.id, AppointmentStatus::Scheduled)
            .await;
        let pool = state.db.clone();
        let app = test::init_service(test_app(state)).await;

        let resp =
            test::call_service(&app, delete(&format!("/admin/clients/{}", client.id)).to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp =
            test::call_service(&app, delete(&format!("/admin/clients/{}", other.id)).to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let remaining = db::clients::list(&pool, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, client.id);
    }

    #[actix_web::test]
    async fn leads_follow_up_flow() {
        let state = test_support::state().await;
        let lead = db::leads::insert(
            &state.db,
            &crate::models::LeadDraft {
                full_name: "Pooja".to_string(),
                phone: Some("9876543210".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let app = test::init_service(test_app(state)).await;

        let rows: Vec<Value> =
            test::call_and_read_body_json(&app, get("/admin/leads").to_request()).await;
        assert_eq!(rows[0]["status"], "new");
        assert_eq!(rows[0]["status_label"], "New");
        assert_eq!(rows[0]["follow_up_status"], "none");

        let updated: Value = test::call_and_read_body_json(
            &app,
            send_json(
                "POST",
                &format!("/admin/leads/{}/follow-up/quick", lead.id),
                json!({"days": 3}),
            )
            .to_request(),
        )
        .await;
        assert!(updated["follow_up_date"].is_string());

        let upcoming: Vec<Value> = test::call_and_read_body_json(
            &app,
            get("/admin/leads?follow_up=upcoming").to_request(),
        )
        .await;
        assert_eq!(upcoming.len(), 1);

        let cleared: Value = test::call_and_read_body_json(
            &app,
            send_json(
                "PUT",
                &format!("/admin/leads/{}/follow-up", lead.id),
                json!({"follow_up_date": null}),
            )
            .to_request(),
        )
        .await;
        assert_eq!(cleared["follow_up_date"], Value::Null);

        let contacted: Value = test::call_and_read_body_json(
            &app,
            send_json(
                "PUT",
                &format!("/admin/leads/{}/status", lead.id),
                json!({"status": "contacted"}),
            )
            .to_request(),
        )
        .await;
        assert_eq!(contacted["status"], "contacted");

        let resp = test::call_service(
            &app,
            send_json("PUT", "/admin/leads/missing/status", json!({"status": "rejected"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_lead_status_filter_is_rejected() {
        let state = test_support::state().await;
        for name in ["Asha", "Bina"] {
            db::leads::insert(
                &state.db,
                &crate::models::LeadDraft {
                    full_name: name.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        let app = test::init_service(test_app(state)).await;

        let resp = test::call_service(&app, get("/admin/leads?status=bogus").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "status");

        let all: Vec<Value> =
            test::call_and_read_body_json(&app, get("/admin/leads?status=all").to_request()).await;
        assert_eq!(all.len(), 2);
        let contacted: Vec<Value> = test::call_and_read_body_json(
            &app,
            get("/admin/leads?status=contacted").to_request(),
        )
        .await;
        assert!(contacted.is_empty());
    }

    #[actix_web::test]
    async fn malformed_json_and_query_get_field_errors() {
        let state = test_support::state().await;
        let client = test_support::client(&state.db, "Ritu").await;
        let service = test_support::service(&state.db, "Facial", 600.0).await;
        let app = test::init_service(test_app(state)).await;

        let resp = test::call_service(
            &app,
            send_json(
                "POST",
                "/admin/appointments",
                json!({
                    "client_id": client.id,
                    "service_id": service.id,
                    "appointment_date": "2026-05-01T10:30",
                    "status": "postponed",
                }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "body");
        assert!(body["error"].as_str().unwrap().contains("postponed"));

        let resp =
            test::call_service(&app, get("/admin/leads?follow_up=someday").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "query");
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn reviews_move_from_pending_to_approved() {
        let state = test_support::state().await;
        let review = db::reviews::insert(
            &state.db,
            &ReviewDraft {
                full_name: "Neha".to_string(),
                email: None,
                rating: 5,
                review_text: "Wonderful".to_string(),
            },
        )
        .await
        .unwrap();
        let app = test::init_service(test_app(state)).await;

        let queues: Value =
            test::call_and_read_body_json(&app, get("/admin/reviews").to_request()).await;
        assert_eq!(queues["pending"].as_array().unwrap().len(), 1);
        assert!(queues["approved"].as_array().unwrap().is_empty());

        let approved: Value = test::call_and_read_body_json(
            &app,
            send_json("POST", &format!("/admin/reviews/{}/approve", review.id), json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(approved["is_approved"], true);

        let resp =
            test::call_service(&app, delete(&format!("/admin/reviews/{}", review.id)).to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn dashboard_reports_counts() {
        let state = test_support::state().await;
        test_support::client(&state.db, "Ritu").await;
        let app = test::init_service(test_app(state)).await;

        let body: Value =
            test::call_and_read_body_json(&app, get("/admin/dashboard").to_request()).await;
        assert_eq!(body["user"], "Test Admin");
        assert_eq!(body["total_clients"], 1);
        assert_eq!(body["today_revenue"], 0.0);
    }

    #[actix_web::test]
    async fn uploads_return_a_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_support::state_with(test_support::config_with_uploads(dir.path())).await;
        let app = test::init_service(test_app(state)).await;

        let req = test::TestRequest::post()
            .uri("/admin/uploads")
            .insert_header(ADMIN_BASIC_AUTH)
            .insert_header((header::CONTENT_TYPE, "image/png"))
            .set_payload(&b"\x89PNG fake"[..])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["url"].as_str().unwrap().starts_with("/uploads/"));

        let req = test::TestRequest::post()
            .uri("/admin/uploads")
            .insert_header(ADMIN_BASIC_AUTH)
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("hello")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn planned_pages_list_features() {
        let app = test::init_service(test_app(test_support::state().await)).await;
        let body: Value =
            test::call_and_read_body_json(&app, get("/admin/reports").to_request()).await;
        assert_eq!(body["planned"][0], "Revenue analytics");
        let body: Value =
            test::call_and_read_body_json(&app, get("/admin/settings").to_request()).await;
        assert_eq!(body["planned"].as_array().unwrap().len(), 5);
    }
}
